//! Breakpoint observer
//!
//! Tracks the width of a viewport and classifies it as mobile, tablet or desktop. The viewport is
//! injected when the observer is activated; without one the observer reports a placeholder width
//! of `0` that should not be trusted for layout decisions.
//!
//! The resize subscription is held by a guard and released exactly once, when the observer is
//! released or dropped.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use axum::http::HeaderMap;
use serde::Serialize;
use tokio::sync::watch;

/// Smallest width that counts as a tablet
pub const TABLET_MIN_WIDTH: u32 = 640;

/// Smallest width that counts as a desktop
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

/// Client hint headers carrying the viewport width, preferred first
const VIEWPORT_WIDTH_HEADERS: [&str; 2] = ["sec-ch-viewport-width", "viewport-width"];

/// Device class derived from a width
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    /// Narrower than a tablet
    Mobile,

    /// From the tablet width up to, but not including, the desktop width
    Tablet,

    /// Desktop width and wider
    Desktop,
}

impl DeviceClass {
    /// Classify a width
    pub fn from_width(width: u32) -> Self {
        if width < TABLET_MIN_WIDTH {
            Self::Mobile
        } else if width < DESKTOP_MIN_WIDTH {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Name of the class, as used in templates
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

/// Current width and its classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)] // one flag per class
pub struct Breakpoints {
    /// Viewport width in pixels
    pub width: u32,

    /// Narrower than 640 pixels
    pub is_mobile: bool,

    /// 640 up to 1024 pixels
    pub is_tablet: bool,

    /// 1024 pixels and wider
    pub is_desktop: bool,
}

impl Breakpoints {
    /// Classify a width
    pub fn from_width(width: u32) -> Self {
        let class = DeviceClass::from_width(width);

        Self {
            width,
            is_mobile: class == DeviceClass::Mobile,
            is_tablet: class == DeviceClass::Tablet,
            is_desktop: class == DeviceClass::Desktop,
        }
    }

    /// The class these breakpoints fall in
    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::from_width(self.width)
    }
}

/// Callback for resize notifications, gets the new width
pub type ResizeListener = Box<dyn Fn(u32) + Send + Sync>;

/// Handle to a registered resize listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// A display surface that has a width and reports resizes
pub trait Viewport: Send + Sync {
    /// Current width in pixels
    fn width(&self) -> u32;

    /// Register a listener for resizes
    fn subscribe(&self, listener: ResizeListener) -> ListenerId;

    /// Remove a listener, unknown IDs are ignored
    fn unsubscribe(&self, id: ListenerId);
}

/// In-process viewport
///
/// Keeps a width and notifies its listeners, in registration order, on every resize
#[derive(Default)]
pub struct SharedViewport {
    /// Current width
    width: AtomicU32,

    /// Source of listener IDs
    next_id: AtomicU64,

    /// Registered listeners, ordered by ID and therefore by registration
    listeners: Mutex<BTreeMap<ListenerId, Arc<dyn Fn(u32) + Send + Sync>>>,
}

impl SharedViewport {
    /// Create a viewport with a width
    pub fn new(width: u32) -> Self {
        Self {
            width: AtomicU32::new(width),
            ..Self::default()
        }
    }

    /// Create a viewport from the viewport width client hints of a request
    ///
    /// A request without a usable hint has no display surface
    pub fn from_client_hints(headers: &HeaderMap) -> Option<Self> {
        VIEWPORT_WIDTH_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|value| value.to_str().ok())
                    .and_then(parse_width)
            })
            .map(Self::new)
    }

    /// Change the width and notify every listener
    pub fn resize(&self, width: u32) {
        self.width.store(width, Ordering::SeqCst);

        // call outside the lock, listeners may (un)subscribe
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect::<Vec<_>>();

        for listener in listeners {
            listener(width);
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Viewport for SharedViewport {
    fn width(&self) -> u32 {
        self.width.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: ResizeListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));

        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::from(listener));

        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Client hints may carry fractions, widths are whole pixels
fn parse_width(value: &str) -> Option<u32> {
    let width = value.trim().parse::<f64>().ok()?;

    if width.is_finite() && width >= 0.0 && width <= f64::from(u32::MAX) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // checked above
        Some(width.floor() as u32)
    } else {
        None
    }
}

/// Registered resize listener, removed from its viewport when released
struct Subscription {
    /// Viewport the listener is registered with
    viewport: Arc<dyn Viewport>,

    /// The listener, until released
    id: Option<ListenerId>,
}

impl Subscription {
    /// Remove the listener, only the first call does anything
    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.viewport.unsubscribe(id);

            tracing::trace!("Released resize listener {id:?}");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Observes a viewport and keeps its breakpoints up to date
pub struct BreakpointObserver {
    /// Latest breakpoints, shared with the resize listener
    state: Arc<watch::Sender<Breakpoints>>,

    /// Was the width read from a real viewport?
    measured: bool,

    /// Resize subscription, absent without a viewport
    subscription: Option<Subscription>,
}

impl BreakpointObserver {
    /// Start observing a viewport
    ///
    /// With a viewport, the width is read right away and every resize updates the breakpoints.
    /// Without one, the observer reports the placeholder width `0`.
    pub fn activate(viewport: Option<Arc<dyn Viewport>>) -> Self {
        let Some(viewport) = viewport else {
            let (state, _) = watch::channel(Breakpoints::from_width(0));

            return Self {
                state: Arc::new(state),
                measured: false,
                subscription: None,
            };
        };

        let (state, _) = watch::channel(Breakpoints::from_width(viewport.width()));
        let state = Arc::new(state);

        let listener_state = Arc::clone(&state);
        let id = viewport.subscribe(Box::new(move |width| {
            listener_state.send_replace(Breakpoints::from_width(width));
        }));

        tracing::trace!("Observing viewport with resize listener {id:?}");

        Self {
            state,
            measured: true,
            subscription: Some(Subscription {
                viewport,
                id: Some(id),
            }),
        }
    }

    /// Current breakpoints
    pub fn breakpoints(&self) -> Breakpoints {
        *self.state.borrow()
    }

    /// Does the width come from a real viewport?
    ///
    /// When `false`, the width is the `0` placeholder
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Receiver that is pushed every change of the breakpoints
    pub fn watch(&self) -> watch::Receiver<Breakpoints> {
        self.state.subscribe()
    }

    /// Stop observing the viewport
    ///
    /// Safe to call more than once, dropping the observer does the same
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.release();
        }
    }
}
