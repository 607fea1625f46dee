//! Toast notifications stacked in a fixed corner container

use crate::page::{NodeId, Page};
use crate::state::Notification;
use std::time::Duration;
use tokio::time::Instant;

pub const CONTAINER_ID: &str = "toast-container";

#[derive(Debug)]
struct Toast {
    node: NodeId,
    close_button: NodeId,
    notification: Notification,
    expires_at: Instant,
    /// Set once the toast starts fading out
    removal_at: Option<Instant>,
}

/// Lazily mounted notification area. The container is created on first use
/// and never removed; toasts remove themselves.
#[derive(Debug)]
pub struct NotificationSurface {
    container: Option<NodeId>,
    toasts: Vec<Toast>,
    lifetime: Duration,
    fade: Duration,
}

impl NotificationSurface {
    pub fn new(lifetime: Duration, fade: Duration) -> Self {
        Self {
            container: None,
            toasts: Vec::new(),
            lifetime,
            fade,
        }
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Notifications whose element is still in the page
    pub fn active(&self) -> Vec<&Notification> {
        self.toasts.iter().map(|t| &t.notification).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    fn ensure_container<P: Page + ?Sized>(&mut self, page: &mut P) -> NodeId {
        if let Some(container) = self.container {
            return container;
        }
        let container = match page.element_by_id(CONTAINER_ID) {
            Some(existing) => existing,
            None => {
                let c = page.create_element("div");
                page.set_attribute(c, "id", CONTAINER_ID);
                page.set_style(c, "position", "fixed");
                page.set_style(c, "top", "20px");
                page.set_style(c, "right", "20px");
                page.set_style(c, "z-index", "9999");
                page.set_style(c, "max-width", "350px");
                let body = page.body();
                page.append_child(body, c);
                tracing::debug!("Mounted notification container");
                c
            }
        };
        self.container = Some(container);
        container
    }

    /// Show a notification. It dismisses itself after the configured lifetime.
    pub fn notify<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        notification: Notification,
        now: Instant,
    ) -> NodeId {
        let container = self.ensure_container(page);

        let toast = page.create_element("div");
        page.set_attribute(
            toast,
            "class",
            &format!(
                "alert alert-{} alert-dismissible fade show",
                notification.severity
            ),
        );
        page.set_attribute(toast, "role", "alert");
        page.set_text_content(toast, &notification.message);

        let close_button = page.create_element("button");
        page.set_attribute(close_button, "type", "button");
        page.set_attribute(close_button, "class", "btn-close");
        page.set_attribute(close_button, "data-bs-dismiss", "alert");
        page.set_attribute(close_button, "aria-label", "Sluiten");
        page.append_child(toast, close_button);
        page.append_child(container, toast);

        tracing::debug!(
            "Notification ({}): {}",
            notification.severity,
            notification.message
        );
        self.toasts.push(Toast {
            node: toast,
            close_button,
            notification,
            expires_at: now + self.lifetime,
            removal_at: None,
        });
        toast
    }

    /// Handle a click; returns true if it hit a close control
    pub fn on_click<P: Page + ?Sized>(&mut self, page: &mut P, target: NodeId, now: Instant) -> bool {
        let Some(toast) = self
            .toasts
            .iter_mut()
            .find(|t| page.contains(t.close_button, target))
        else {
            return false;
        };
        if toast.removal_at.is_none() {
            page.remove_class(toast.node, "show");
            toast.removal_at = Some(now + self.fade);
        }
        true
    }

    /// Expire and remove toasts whose time has come
    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) {
        let fade = self.fade;
        for toast in &mut self.toasts {
            if toast.removal_at.is_none() && now >= toast.expires_at {
                page.remove_class(toast.node, "show");
                toast.removal_at = Some(toast.expires_at + fade);
            }
        }
        self.toasts.retain(|toast| match toast.removal_at {
            Some(at) if now >= at => {
                page.remove(toast.node);
                false
            }
            _ => true,
        });
    }
}
