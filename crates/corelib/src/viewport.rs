//! Viewport controller: sole owner and writer of the model's appearance.
//!
//! Texture selections are asynchronous. Each intent (texture, color or reset)
//! is stamped with a fresh [`RequestToken`]; a load completion only applies if
//! it still carries the latest token, so the most recently *issued* intent
//! wins regardless of the order in which loads finish.

use crate::appearance::Appearance;
use crate::color::ColorValue;
use crate::error::LoadError;
use crate::turntable::Turntable;

/// Monotonically increasing sequence number for selection intents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl RequestToken {
    #[inline]
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// State of the most recently issued texture load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: RequestToken,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadCompletion<I> {
    pub token: RequestToken,
    pub path: String,
    pub result: Result<I, LoadError>,
}

/// Asynchronous image source. Implementations must never block in either call.
pub trait TextureLoader {
    type Image;

    /// Start loading `request.path`. The outcome is reported later via
    /// [`TextureLoader::try_recv`], tagged with `request.token`.
    fn request(&mut self, request: LoadRequest);

    /// Next finished load, if any.
    fn try_recv(&mut self) -> Option<LoadCompletion<Self::Image>>;
}

pub struct ViewportController<L: TextureLoader> {
    loader: L,
    appearance: Appearance<L::Image>,
    status: LoadStatus,
    latest: RequestToken,
    revision: u64,
    turntable: Turntable,
}

impl<L: TextureLoader> ViewportController<L> {
    pub fn new(loader: L) -> Self {
        Self::with_turntable(loader, Turntable::default())
    }

    pub fn with_turntable(loader: L, turntable: Turntable) -> Self {
        Self {
            loader,
            appearance: Appearance::Neutral,
            status: LoadStatus::Idle,
            latest: RequestToken::default(),
            revision: 0,
            turntable,
        }
    }

    #[inline]
    pub fn appearance(&self) -> &Appearance<L::Image> {
        &self.appearance
    }

    #[inline]
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Bumped on every appearance change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn latest_token(&self) -> RequestToken {
        self.latest
    }

    #[inline]
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    #[inline]
    pub fn turntable(&self) -> &Turntable {
        &self.turntable
    }

    #[inline]
    pub fn turntable_mut(&mut self) -> &mut Turntable {
        &mut self.turntable
    }

    /// Begin loading a texture. An active color is cleared right away; an
    /// active texture stays on screen until this load resolves.
    pub fn select_texture(&mut self, asset_path: &str) {
        let token = self.issue_token();
        self.status = LoadStatus::Loading;
        if self.appearance.active_color().is_some() {
            self.set_appearance(Appearance::Neutral);
        }
        log::info!("Loading texture {asset_path} (request {})", token.0);
        self.loader.request(LoadRequest {
            token,
            path: asset_path.to_string(),
        });
    }

    /// Apply a flat color. Supersedes any pending texture load.
    pub fn select_color(&mut self, color: ColorValue) {
        self.issue_token();
        self.status = LoadStatus::Idle;
        if self.appearance.active_color() != Some(color) {
            log::info!("Applying color {color}");
            self.set_appearance(Appearance::Tinted(color));
        }
    }

    /// Return to the neutral material. Supersedes any pending texture load.
    pub fn reset(&mut self) {
        self.issue_token();
        self.status = LoadStatus::Idle;
        if !self.appearance.is_neutral() {
            log::info!("Resetting to neutral material");
            self.set_appearance(Appearance::Neutral);
        }
    }

    /// Drain finished loads. Returns `true` if the appearance changed.
    pub fn poll(&mut self) -> bool {
        let before = self.revision;
        while let Some(completion) = self.loader.try_recv() {
            self.complete(completion);
        }
        self.revision != before
    }

    fn complete(&mut self, completion: LoadCompletion<L::Image>) {
        let LoadCompletion {
            token,
            path,
            result,
        } = completion;

        if token != self.latest {
            log::debug!(
                "Discarding superseded load of {path} (request {}, latest {})",
                token.0,
                self.latest.0
            );
            return;
        }

        match result {
            Ok(image) => {
                log::info!("Texture {path} applied");
                self.status = LoadStatus::Ready;
                self.set_appearance(Appearance::Textured { path, image });
            }
            Err(err) => {
                log::warn!("Texture {path} could not be loaded, keeping current material: {err}");
                self.status = LoadStatus::Failed;
            }
        }
    }

    fn issue_token(&mut self) -> RequestToken {
        self.latest = self.latest.next();
        self.latest
    }

    fn set_appearance(&mut self, appearance: Appearance<L::Image>) {
        self.appearance = appearance;
        self.revision += 1;
    }

    /// Frame hook: advances the passive rotation unless the user is dragging.
    #[inline]
    pub fn advance_frame(&mut self) {
        self.turntable.advance_frame();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::turntable::DragState;

    /// Loader driven by hand so tests control completion order.
    #[derive(Default)]
    pub(crate) struct ManualLoader {
        pub requests: Vec<LoadRequest>,
        ready: VecDeque<LoadCompletion<String>>,
    }

    impl ManualLoader {
        fn request_for(&self, path: &str) -> LoadRequest {
            self.requests
                .iter()
                .rev()
                .find(|r| r.path == path)
                .cloned()
                .expect("no request issued for path")
        }

        /// Finish the most recent load of `path` successfully.
        pub fn succeed(&mut self, path: &str) {
            let req = self.request_for(path);
            self.ready.push_back(LoadCompletion {
                token: req.token,
                path: req.path.clone(),
                result: Ok(format!("pixels of {}", req.path)),
            });
        }

        pub fn fail(&mut self, path: &str) {
            let req = self.request_for(path);
            self.ready.push_back(LoadCompletion {
                token: req.token,
                path: req.path.clone(),
                result: Err(LoadError::NotFound { path: req.path }),
            });
        }
    }

    impl TextureLoader for ManualLoader {
        type Image = String;

        fn request(&mut self, request: LoadRequest) {
            self.requests.push(request);
        }

        fn try_recv(&mut self) -> Option<LoadCompletion<String>> {
            self.ready.pop_front()
        }
    }

    pub(crate) fn controller() -> ViewportController<ManualLoader> {
        ViewportController::new(ManualLoader::default())
    }

    const LEATHER: &str = "/assets/leather-texture.jpg";
    const DENIM: &str = "/assets/denim-texture.jpg";
    const MISSING: &str = "/assets/missing.jpg";
    const RED: ColorValue = ColorValue::from_hex(0xFF0000);

    fn assert_exclusive(ctl: &ViewportController<ManualLoader>) {
        let a = ctl.appearance();
        assert!(!(a.active_texture().is_some() && a.active_color().is_some()));
    }

    #[test]
    fn starts_neutral_and_idle() {
        let ctl = controller();
        assert!(ctl.appearance().is_neutral());
        assert_eq!(ctl.status(), LoadStatus::Idle);
        assert_eq!(ctl.revision(), 0);
    }

    #[test]
    fn texture_applies_on_success() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        assert_eq!(ctl.status(), LoadStatus::Loading);
        assert!(ctl.appearance().active_texture().is_none());

        ctl.loader_mut().succeed(LEATHER);
        assert!(ctl.poll());
        assert_eq!(ctl.appearance().active_texture(), Some(LEATHER));
        assert_eq!(ctl.appearance().active_color(), None);
        assert_eq!(ctl.status(), LoadStatus::Ready);
    }

    #[test]
    fn later_intent_wins_over_later_completion() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        ctl.select_texture(DENIM);

        ctl.loader_mut().succeed(DENIM);
        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();

        assert_eq!(ctl.appearance().active_texture(), Some(DENIM));
        assert_eq!(ctl.status(), LoadStatus::Ready);
    }

    #[test]
    fn stale_completion_arriving_alone_is_ignored() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        ctl.select_texture(DENIM);

        ctl.loader_mut().succeed(LEATHER);
        assert!(!ctl.poll());
        assert!(ctl.appearance().is_neutral());
        assert_eq!(ctl.status(), LoadStatus::Loading);

        ctl.loader_mut().succeed(DENIM);
        assert!(ctl.poll());
        assert_eq!(ctl.appearance().active_texture(), Some(DENIM));
    }

    #[test]
    fn color_supersedes_pending_texture() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        ctl.select_color(RED);
        assert_eq!(ctl.status(), LoadStatus::Idle);

        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();
        assert_eq!(ctl.appearance().active_color(), Some(RED));
        assert!(ctl.appearance().active_texture().is_none());
    }

    #[test]
    fn stale_failure_does_not_touch_status() {
        let mut ctl = controller();
        ctl.select_texture(MISSING);
        ctl.select_texture(LEATHER);
        ctl.loader_mut().fail(MISSING);
        ctl.poll();
        assert_eq!(ctl.status(), LoadStatus::Loading);
    }

    #[test]
    fn failure_keeps_previous_texture() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();
        let revision = ctl.revision();

        ctl.select_texture(MISSING);
        assert_eq!(ctl.appearance().active_texture(), Some(LEATHER));
        ctl.loader_mut().fail(MISSING);
        assert!(!ctl.poll());

        assert_eq!(ctl.status(), LoadStatus::Failed);
        assert_eq!(ctl.appearance().active_texture(), Some(LEATHER));
        assert_eq!(ctl.revision(), revision);
    }

    #[test]
    fn failure_from_neutral_stays_neutral() {
        let mut ctl = controller();
        ctl.select_texture(MISSING);
        ctl.loader_mut().fail(MISSING);
        ctl.poll();
        assert!(ctl.appearance().is_neutral());
        assert_eq!(ctl.status(), LoadStatus::Failed);
    }

    #[test]
    fn color_is_cleared_when_texture_load_begins() {
        let mut ctl = controller();
        ctl.select_color(RED);
        ctl.select_texture(LEATHER);

        // Pending interval: no tint, no texture yet.
        assert!(ctl.appearance().is_neutral());
        assert_eq!(ctl.status(), LoadStatus::Loading);

        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();
        assert_eq!(ctl.appearance().active_texture(), Some(LEATHER));
        assert_eq!(ctl.appearance().active_color(), None);
    }

    #[test]
    fn select_color_is_idempotent() {
        let mut once = controller();
        once.select_color(RED);

        let mut twice = controller();
        twice.select_color(RED);
        twice.select_color(RED);

        assert_eq!(once.appearance(), twice.appearance());
        assert_eq!(once.status(), twice.status());
        assert_eq!(once.revision(), twice.revision());
    }

    #[test]
    fn reset_returns_to_neutral_and_drops_pending_load() {
        let mut ctl = controller();
        ctl.select_color(RED);
        ctl.select_texture(LEATHER);
        ctl.reset();
        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();
        assert!(ctl.appearance().is_neutral());
        assert_eq!(ctl.status(), LoadStatus::Idle);
    }

    #[test]
    fn at_most_one_field_active_over_mixed_sequence() {
        let mut ctl = controller();
        let blue = ColorValue::from_hex(0x0000FF);

        ctl.select_texture(LEATHER);
        assert_exclusive(&ctl);
        ctl.select_color(RED);
        assert_exclusive(&ctl);
        ctl.loader_mut().succeed(LEATHER);
        ctl.poll();
        assert_exclusive(&ctl);
        ctl.select_texture(DENIM);
        ctl.loader_mut().succeed(DENIM);
        ctl.poll();
        assert_exclusive(&ctl);
        ctl.select_color(blue);
        assert_exclusive(&ctl);
        assert_eq!(ctl.appearance().active_color(), Some(blue));
    }

    #[test]
    fn tokens_increase_per_intent() {
        let mut ctl = controller();
        ctl.select_texture(LEATHER);
        ctl.select_color(RED);
        ctl.select_texture(DENIM);
        let tokens: Vec<u64> = ctl.loader_mut().requests.iter().map(|r| r.token.0).collect();
        assert_eq!(tokens, vec![1, 3]);
        assert_eq!(ctl.latest_token(), RequestToken(3));
    }

    #[test]
    fn rotation_is_independent_of_appearance() {
        let mut ctl = controller();
        ctl.advance_frame();
        let angle = ctl.turntable().angle();
        assert!(angle > 0.0);

        ctl.turntable_mut().pointer_down();
        ctl.select_color(RED);
        ctl.advance_frame();
        assert_eq!(ctl.turntable().angle(), angle);
        assert_eq!(ctl.turntable().drag_state(), DragState::Dragging);

        ctl.turntable_mut().pointer_up();
        ctl.advance_frame();
        assert!(ctl.turntable().angle() > angle);
        assert_eq!(ctl.appearance().active_color(), Some(RED));
    }
}
