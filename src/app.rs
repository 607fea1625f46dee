//! Application assembly: owns the page and routes events to the behaviours

use crate::config::SiteConfig;
use crate::page::{NodeId, Page, PageEvent, SelectorError};
use crate::state::{Behavior, InitContext};
use crate::transport::{SubmitError, SubmitTransport};
use crate::ui::{
    mark_active_links, FaqSearch, FormController, ImageFallback, MicroInteractions,
    NavigationMenu, NotificationSurface, ScrollSpy, Selectors, SmoothScroll, SubmitStep,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// A transport call that has finished, waiting to be applied on the next tick
type Settled = (NodeId, Result<(), SubmitError>);

/// Main application struct
pub struct App<P: Page, T: SubmitTransport> {
    page: P,
    transport: Arc<T>,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
    config: SiteConfig,
    selectors: Selectors,
    /// Which behaviours have been wired
    ctx: InitContext,
    notifications: NotificationSurface,
    navigation: Option<NavigationMenu>,
    scroll_spy: Option<ScrollSpy>,
    smooth_scroll: Option<SmoothScroll>,
    images: Option<ImageFallback>,
    forms: Option<FormController>,
    faq: Option<FaqSearch>,
    micro: Option<MicroInteractions>,
}

impl<P: Page, T: SubmitTransport + 'static> App<P, T> {
    /// Create a new App. Fails if the DOM contract holds a bad selector.
    pub fn new(page: P, transport: T, config: SiteConfig) -> Result<Self, SelectorError> {
        let selectors = Selectors::compile(&config.dom)?;
        let notifications = NotificationSurface::new(
            config.timings.notification_lifetime(),
            config.timings.notification_fade(),
        );
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Ok(Self {
            page,
            transport: Arc::new(transport),
            settled_tx,
            settled_rx,
            config,
            selectors,
            ctx: InitContext::default(),
            notifications,
            navigation: None,
            scroll_spy: None,
            smooth_scroll: None,
            images: None,
            forms: None,
            faq: None,
            micro: None,
        })
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[cfg(test)]
    pub fn context(&self) -> &InitContext {
        &self.ctx
    }

    pub fn notifications(&self) -> &NotificationSurface {
        &self.notifications
    }

    #[cfg(test)]
    pub fn forms(&self) -> Option<&FormController> {
        self.forms.as_ref()
    }

    /// Wire every behaviour. Calling this again does nothing.
    pub fn init(&mut self) {
        let now = Instant::now();
        let timings = &self.config.timings;
        let fallback = self.config.header_fallback_height;

        if self.ctx.claim(Behavior::NavigationMenu) {
            self.navigation = NavigationMenu::init(
                &self.page,
                &self.selectors,
                timings.resize_debounce(),
                self.config.mobile_breakpoint,
            );
        }
        if self.ctx.claim(Behavior::ScrollSpy) {
            self.scroll_spy =
                ScrollSpy::init(&self.page, &self.selectors, timings.scroll_throttle(), fallback);
        }
        if self.ctx.claim(Behavior::SmoothScroll) {
            self.smooth_scroll = Some(SmoothScroll::init(
                &self.page,
                timings.smooth_scroll(),
                timings.initial_scroll_delay(),
                fallback,
                now,
            ));
        }
        if self.ctx.claim(Behavior::ActiveMenu) {
            mark_active_links(&mut self.page, &self.selectors);
        }
        if self.ctx.claim(Behavior::Images) {
            self.images = Some(ImageFallback::init(&mut self.page, &self.selectors));
        }
        if self.ctx.claim(Behavior::Forms) {
            self.forms = Some(FormController::init(
                &self.page,
                &self.selectors,
                &self.config.redirect_target,
                timings.redirect_delay(),
            ));
        }
        if self.ctx.claim(Behavior::FaqSearch) {
            self.faq = FaqSearch::init(&self.page, &self.selectors, timings.search_debounce());
        }
        if self.ctx.claim(Behavior::MicroInteractions) {
            self.micro = Some(MicroInteractions::init(&self.page, &self.selectors));
        }

        tracing::debug!(
            complete = self.ctx.is_complete(),
            navigation = self.navigation.is_some(),
            scroll_spy = self.scroll_spy.is_some(),
            forms = self.forms.as_ref().map_or(0, |f| f.form_count()),
            faq = self.faq.is_some(),
            "Page behaviours initialized"
        );
    }

    /// Route one event. Returns true if its default action was prevented.
    ///
    /// Never waits on the transport: a valid submit is handed to a background
    /// task and settled by a later [`App::tick`].
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        let now = Instant::now();
        match event {
            PageEvent::Click(target) => {
                self.notifications.on_click(&mut self.page, target, now);
                let mut prevented = false;
                if let Some(nav) = &self.navigation {
                    prevented |= nav.on_click(&mut self.page, target);
                }
                if let Some(scroll) = &mut self.smooth_scroll {
                    prevented |= scroll.on_click(&mut self.page, &self.selectors, target, now);
                }
                prevented
            }
            PageEvent::KeyDown(key) => {
                if let Some(nav) = &self.navigation {
                    nav.on_keydown(&mut self.page, &key);
                }
                false
            }
            PageEvent::Resize => {
                if let Some(nav) = &mut self.navigation {
                    nav.on_resize(now);
                }
                false
            }
            PageEvent::Scroll => {
                if let Some(spy) = &mut self.scroll_spy {
                    spy.on_scroll(&mut self.page, now);
                }
                false
            }
            PageEvent::Blur(target) => {
                if let Some(forms) = &mut self.forms {
                    forms.on_blur(&mut self.page, target);
                }
                false
            }
            PageEvent::Input(target) => {
                if let Some(forms) = &mut self.forms {
                    forms.on_input(&mut self.page, target);
                }
                if let Some(faq) = &mut self.faq {
                    faq.on_input(&self.page, target, now);
                }
                false
            }
            PageEvent::Submit(form) => {
                let Some(forms) = &mut self.forms else {
                    return false;
                };
                let step = forms.begin_submit(&mut self.page, form, &mut self.notifications, now);
                let intercepted = step.intercepted();
                match step {
                    SubmitStep::Rejected { invalid } => {
                        tracing::debug!("Rejected submit of {form:?}: {invalid} invalid field(s)");
                    }
                    SubmitStep::Submitting(submission) => {
                        let transport = Arc::clone(&self.transport);
                        let tx = self.settled_tx.clone();
                        tokio::spawn(async move {
                            let result = transport.submit(&submission).await;
                            // The receiver only goes away with the app itself
                            let _ = tx.send((form, result));
                        });
                    }
                    SubmitStep::NotWired | SubmitStep::InFlight => {}
                }
                intercepted
            }
            PageEvent::MouseEnter(target) => {
                if let Some(micro) = &self.micro {
                    micro.on_mouse_enter(&mut self.page, target);
                }
                false
            }
            PageEvent::MouseLeave(target) => {
                if let Some(micro) = &self.micro {
                    micro.on_mouse_leave(&mut self.page, target);
                }
                false
            }
            PageEvent::ImageError(target) => {
                if let Some(images) = &mut self.images {
                    images.on_error(&mut self.page, target);
                }
                false
            }
        }
    }

    /// Advance every timer-driven behaviour to `now`
    pub fn tick(&mut self, now: Instant) {
        while let Ok((form, result)) = self.settled_rx.try_recv() {
            if let Some(forms) = &mut self.forms {
                forms.finish_submit(&mut self.page, form, result, &mut self.notifications, now);
            }
        }
        self.notifications.tick(&mut self.page, now);
        if let Some(nav) = &mut self.navigation {
            nav.tick(&mut self.page, now);
        }
        if let Some(scroll) = &mut self.smooth_scroll {
            let before = self.page.scroll_y();
            scroll.tick(&mut self.page, &self.selectors, now);
            // Animated scrolling fires scroll events like a manual scroll does
            if self.page.scroll_y() != before {
                if let Some(spy) = &mut self.scroll_spy {
                    spy.on_scroll(&mut self.page, now);
                }
            }
        }
        if let Some(spy) = &mut self.scroll_spy {
            spy.tick(&mut self.page, now);
        }
        if let Some(faq) = &mut self.faq {
            faq.tick(&mut self.page, now);
        }
        if let Some(target) = self.forms.as_mut().and_then(|f| f.poll_redirect(now)) {
            self.page.navigate(&target);
        }
    }

    /// True when no timer is waiting to fire and no submission is in flight
    pub fn is_idle(&self) -> bool {
        self.notifications.is_empty()
            && !self.navigation.as_ref().is_some_and(|n| n.has_pending_work())
            && !self.scroll_spy.as_ref().is_some_and(|s| s.has_pending_work())
            && !self.smooth_scroll.as_ref().is_some_and(|s| s.has_pending_work())
            && !self.faq.as_ref().is_some_and(|f| f.has_pending_work())
            && !self
                .forms
                .as_ref()
                .is_some_and(|f| f.has_in_flight() || f.has_pending_redirect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{HeadlessPage, NodeId};
    use crate::state::Severity;
    use crate::transport::{MockSubmitTransport, SimulatedTransport, SubmitError};
    use crate::ui::CONTAINER_ID;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    struct Site {
        page: HeadlessPage,
        form: NodeId,
        name: NodeId,
        email: NodeId,
        button: NodeId,
        toggle: NodeId,
        anchor: NodeId,
    }

    fn site() -> Site {
        let mut page = HeadlessPage::new();
        page.set_inner_width(375.0);
        let header = page.add(page.body(), "header", &[("class", "l-header")]);
        page.set_layout(header, 0.0, 80.0);
        let toggle = page.add(header, "button", &[("class", "navbar-toggler")]);
        let collapse = page.add(header, "div", &[("class", "navbar-collapse")]);
        let anchor = page.add(
            collapse,
            "a",
            &[("class", "nav-link"), ("href", "#contact")],
        );
        let section = page.add(page.body(), "section", &[("id", "contact")]);
        page.set_layout(section, 900.0, 700.0);

        let form = page.add(section, "form", &[("id", "contact-form"), ("class", "c-form")]);
        let g1 = page.add(form, "div", &[("class", "c-form__group")]);
        let name = page.add(
            g1,
            "input",
            &[("type", "text"), ("name", "firstName"), ("required", "")],
        );
        let g2 = page.add(form, "div", &[("class", "c-form__group")]);
        let email = page.add(
            g2,
            "input",
            &[("type", "email"), ("name", "email"), ("required", "")],
        );
        let button = page.add_text(form, "button", &[("type", "submit")], "Verstuur");
        Site {
            page,
            form,
            name,
            email,
            button,
            toggle,
            anchor,
        }
    }

    fn app<T: SubmitTransport + 'static>(page: HeadlessPage, transport: T) -> App<HeadlessPage, T> {
        let mut app = App::new(page, transport, SiteConfig::default()).unwrap();
        app.init();
        app
    }

    fn fill<T: SubmitTransport + 'static>(app: &mut App<HeadlessPage, T>, s: &Site) {
        app.page_mut().set_value(s.name, "Anna de Vries");
        app.page_mut().set_value(s.email, "anna@example.nl");
    }

    fn invalid_count(page: &HeadlessPage) -> usize {
        page.query_all(&crate::page::Selector::parse(".is-invalid").unwrap())
            .len()
    }

    mod wiring {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_bad_contract_fails_construction() {
            let mut config = SiteConfig::default();
            config.dom.header = "header > nav".to_string();
            let result = App::new(HeadlessPage::new(), SimulatedTransport::default(), config);
            assert!(result.is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn test_second_init_is_a_no_op() {
            let s = site();
            let mut app = app(s.page, SimulatedTransport::default());
            assert!(app.context().is_complete());
            let before = app.page().outer_html(app.page().body());

            app.init();
            assert_eq!(app.page().outer_html(app.page().body()), before);
            assert_eq!(app.forms().map(|f| f.form_count()), Some(1));

            // A toggle click still flips exactly once
            assert!(app.dispatch(PageEvent::Click(s.toggle)));
            assert_eq!(
                app.page().attribute(s.toggle, "aria-expanded").as_deref(),
                Some("true")
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_empty_page_has_no_components() {
            let mut app = app(HeadlessPage::new(), SimulatedTransport::default());
            let body = app.page().body();
            assert!(!app.dispatch(PageEvent::Click(body)));
            assert!(!app.dispatch(PageEvent::Submit(body)));
            assert!(app.is_idle());
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test(start_paused = true)]
        async fn test_invalid_submit_reports_each_field_once() {
            let s = site();
            let mut transport = MockSubmitTransport::new();
            transport.expect_submit().times(0);
            let mut app = app(s.page, transport);

            assert!(app.dispatch(PageEvent::Submit(s.form)));
            assert_eq!(invalid_count(app.page()), 2);
            let active = app.notifications().active();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].severity, Severity::Danger);

            // Submitting again does not duplicate error elements
            app.dispatch(PageEvent::Submit(s.form));
            let group = app.page().parent(s.name).unwrap();
            assert_eq!(app.page().children(group).len(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_valid_submit_resets_then_redirects() {
            let s = site();
            let mut app = app(s.page.clone(), SimulatedTransport::default());
            fill(&mut app, &s);

            assert!(app.dispatch(PageEvent::Submit(s.form)));
            assert!(app.page().is_disabled(s.button));
            assert!(!app.is_idle());

            tokio::time::sleep(Duration::from_millis(1499)).await;
            app.tick(Instant::now());
            assert!(app.page().is_disabled(s.button));
            assert_eq!(app.page().value(s.name), "Anna de Vries");

            tokio::time::sleep(Duration::from_millis(2)).await;
            app.tick(Instant::now());
            let page = app.page();
            assert_eq!(page.value(s.name), "");
            assert!(!page.is_disabled(s.button));
            assert_eq!(page.text_content(s.button), "Verstuur");
            let active = app.notifications().active();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].severity, Severity::Success);

            let settled = Instant::now();
            app.tick(settled + Duration::from_millis(999));
            assert!(app.page().navigations().is_empty());
            app.tick(settled + Duration::from_millis(1000));
            assert_eq!(app.page().navigations(), ["thank_you.html"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_second_submit_while_in_flight_is_swallowed() {
            let s = site();
            let mut transport = MockSubmitTransport::new();
            transport
                .expect_submit()
                .withf(|sub| sub.form_id.as_deref() == Some("contact-form"))
                .times(1)
                .returning(|_| Ok(()));
            let mut app = app(s.page.clone(), transport);
            fill(&mut app, &s);

            assert!(app.dispatch(PageEvent::Submit(s.form)));
            // Still intercepted, but nothing new is sent
            assert!(app.dispatch(PageEvent::Submit(s.form)));
            assert!(app.notifications().is_empty());

            tokio::time::sleep(Duration::from_millis(1)).await;
            app.tick(Instant::now());
            assert!(!app.page().is_disabled(s.button));
            assert_eq!(app.notifications().active().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_transport_failure_keeps_values() {
            let s = site();
            let mut transport = MockSubmitTransport::new();
            transport
                .expect_submit()
                .times(1)
                .returning(|_| Err(SubmitError::Unavailable("offline".to_string())));
            let mut app = app(s.page, transport);
            app.page_mut().set_value(s.name, "Anna");
            app.page_mut().set_value(s.email, "anna@example.nl");

            assert!(app.dispatch(PageEvent::Submit(s.form)));
            tokio::time::sleep(Duration::from_millis(1)).await;
            app.tick(Instant::now());

            assert_eq!(app.page().value(s.name), "Anna");
            assert!(!app.page().is_disabled(s.button));
            assert!(!app.forms().is_some_and(|f| f.has_pending_redirect()));
            assert_eq!(
                app.notifications().active()[0].severity,
                Severity::Danger
            );
        }
    }

    mod timers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test(start_paused = true)]
        async fn test_notifications_expire_through_tick() {
            let s = site();
            let mut app = app(s.page, SimulatedTransport::default());
            app.dispatch(PageEvent::Submit(s.form));
            let container = app.page().element_by_id(CONTAINER_ID).unwrap();
            assert_eq!(app.page().children(container).len(), 1);

            app.tick(Instant::now() + Duration::from_millis(5150));
            assert!(app.page().children(container).is_empty());
            assert!(app.is_idle());
        }

        #[tokio::test(start_paused = true)]
        async fn test_timers_keep_running_during_submit() {
            let s = site();
            let transport = SimulatedTransport::new(Duration::from_secs(10));
            let mut app = app(s.page.clone(), transport);

            // Danger toast from a rejected attempt
            app.dispatch(PageEvent::Submit(s.form));
            let container = app.page().element_by_id(CONTAINER_ID).unwrap();
            fill(&mut app, &s);
            assert!(app.dispatch(PageEvent::Submit(s.form)));

            tokio::time::sleep(Duration::from_millis(5150)).await;
            app.tick(Instant::now());
            assert!(app.page().children(container).is_empty());
            assert!(app.page().is_disabled(s.button));
            assert!(!app.is_idle());

            tokio::time::sleep(Duration::from_millis(4851)).await;
            app.tick(Instant::now());
            assert!(!app.page().is_disabled(s.button));
            assert_eq!(app.notifications().active()[0].severity, Severity::Success);
        }

        #[tokio::test(start_paused = true)]
        async fn test_anchor_click_closes_menu_and_scrolls() {
            let s = site();
            let mut app = app(s.page, SimulatedTransport::default());
            app.dispatch(PageEvent::Click(s.toggle));

            assert!(app.dispatch(PageEvent::Click(s.anchor)));
            assert!(!app.page().has_class(app.page().body(), "u-no-scroll"));
            assert!(!app.is_idle());

            app.tick(Instant::now() + Duration::from_millis(400));
            assert_eq!(app.page().scroll_y(), 820.0);
            assert!(app.is_idle());
        }

        #[tokio::test(start_paused = true)]
        async fn test_scroll_spy_follows_scroll() {
            let s = site();
            let mut app = app(s.page, SimulatedTransport::default());
            app.page_mut().scroll_to(900.0);
            app.dispatch(PageEvent::Scroll);
            assert!(app.page().has_class(s.anchor, "active"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_anchor_scroll_ends_on_target_link() {
            let mut s = site();
            let intro = s.page.add(s.page.body(), "section", &[("id", "intro")]);
            s.page.set_layout(intro, 0.0, 900.0);
            let header = s.page.parent(s.toggle).unwrap();
            let collapse = s.page.children(header)[1];
            let intro_link = s
                .page
                .add(collapse, "a", &[("class", "nav-link"), ("href", "#intro")]);
            let mut app = app(s.page, SimulatedTransport::default());

            let start = Instant::now();
            assert!(app.dispatch(PageEvent::Click(s.anchor)));
            let mut elapsed = 0;
            while elapsed < 400 {
                elapsed += 16;
                app.tick(start + Duration::from_millis(elapsed));
            }
            assert_eq!(app.page().scroll_y(), 820.0);

            // The last scroll frame is throttled and runs after the cooldown
            app.tick(start + Duration::from_millis(600));
            assert!(app.page().has_class(s.anchor, "active"));
            assert!(!app.page().has_class(intro_link, "active"));
            assert!(app.is_idle());
        }
    }

    mod scenario {
        use super::*;
        use crate::page::{Scenario, ScenarioStep};
        use pretty_assertions::assert_eq;
        use std::path::Path;

        #[tokio::test(start_paused = true)]
        async fn test_contact_demo_replays_to_redirect() {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/contact.json");
            let scenario = Scenario::load(&path).unwrap();
            let mut app = app(scenario.page.build(), SimulatedTransport::default());

            for step in &scenario.steps {
                match step {
                    ScenarioStep::Wait { wait_ms } => {
                        tokio::time::sleep(Duration::from_millis(*wait_ms)).await;
                        app.tick(Instant::now());
                    }
                    ScenarioStep::Event(event) => {
                        let event = event.apply(app.page_mut()).unwrap();
                        app.dispatch(event);
                    }
                }
            }

            // The submission is still on its way
            assert!(!app.is_idle());
            tokio::time::sleep(Duration::from_millis(1500)).await;
            app.tick(Instant::now());

            let page = app.page();
            assert_eq!(page.scroll_y(), 520.0);
            assert_eq!(page.history(), ["#formulier"]);
            assert_eq!(invalid_count(page), 0);
            let contact = page
                .query(&crate::page::Selector::parse("a[href=\"contact.html\"]").unwrap())
                .unwrap();
            assert!(page.has_class(contact, "active"));

            app.tick(Instant::now() + Duration::from_millis(1000));
            assert_eq!(app.page().navigations(), ["thank_you.html"]);
        }
    }
}
