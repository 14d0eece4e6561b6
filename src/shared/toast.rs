use serde::{Deserialize, Serialize};

/// Toasts dismiss themselves after this long
pub const TOAST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }

    /// Unknown kinds fall back to `Info`
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => ToastKind::Success,
            "error" => ToastKind::Error,
            _ => ToastKind::Info,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ToastKind::Success => "bg-green-500",
            ToastKind::Error => "bg-red-500",
            ToastKind::Info => "bg-blue-500",
        }
    }
}

/// Transient notification shown at the top right of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// What the layout template needs to draw a toast
#[derive(Debug, Serialize)]
pub struct ToastView {
    pub kind: &'static str,
    pub css_class: &'static str,
    pub message: String,
    pub timeout_ms: u64,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            kind: toast.kind.as_str(),
            css_class: toast.kind.css_class(),
            message: toast.message.clone(),
            timeout_ms: TOAST_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classes() {
        assert_eq!(ToastKind::Success.css_class(), "bg-green-500");
        assert_eq!(ToastKind::Error.css_class(), "bg-red-500");
        assert_eq!(ToastKind::Info.css_class(), "bg-blue-500");
    }

    #[test]
    fn test_unknown_kind_is_info() {
        assert_eq!(ToastKind::parse("warning"), ToastKind::Info);
        assert_eq!(ToastKind::parse("error"), ToastKind::Error);
    }

    #[test]
    fn test_view_carries_timeout() {
        let view = ToastView::from(&Toast::success("Saved"));
        assert_eq!(view.timeout_ms, 5000);
        assert_eq!(view.kind, "success");
    }
}
