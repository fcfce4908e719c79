mod notes;
mod spaces;
