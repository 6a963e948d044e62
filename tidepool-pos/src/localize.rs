//! Localized error messages
//!
//! Maps [`ClientError`] to a `{title, message}` pair in the configured
//! display language. Server-provided messages pass through untranslated;
//! the title classifies the failure.

use crate::ClientError;
use shared::Language;

/// A user-facing failure notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedMessage {
    pub title: String,
    pub message: String,
}

impl LocalizedMessage {
    fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Resolve a client error to a localized title/message pair
pub fn client_error_message(err: &ClientError, lang: Language) -> LocalizedMessage {
    match lang {
        Language::En => english(err),
        Language::Ar => arabic(err),
    }
}

fn english(err: &ClientError) -> LocalizedMessage {
    match err {
        ClientError::Http(e) if e.is_timeout() => LocalizedMessage::new(
            "Connection timed out",
            "The server took too long to respond. Please try again.",
        ),
        ClientError::Http(_) => LocalizedMessage::new(
            "Connection error",
            "Could not reach the server. Check your connection and try again.",
        ),
        ClientError::Unauthorized => LocalizedMessage::new(
            "Session expired",
            "Your session has expired. Please sign in again.",
        ),
        ClientError::Forbidden(_) => LocalizedMessage::new(
            "Not allowed",
            "You do not have permission to perform this action.",
        ),
        ClientError::NotFound(_) => LocalizedMessage::new(
            "Not found",
            "The requested cart no longer exists.",
        ),
        ClientError::Validation(detail) => {
            LocalizedMessage::new("Invalid request", detail.clone())
        }
        ClientError::Api(message) => LocalizedMessage::new("Request failed", message.clone()),
        ClientError::Stale => LocalizedMessage::new(
            "Request superseded",
            "A newer request replaced this one.",
        ),
        ClientError::InvalidResponse(_) | ClientError::Serialization(_) => LocalizedMessage::new(
            "Unexpected response",
            "The server returned data the app could not read.",
        ),
        ClientError::Internal(_) => LocalizedMessage::new(
            "Server error",
            "Something went wrong on the server. Please try again.",
        ),
    }
}

fn arabic(err: &ClientError) -> LocalizedMessage {
    match err {
        ClientError::Http(e) if e.is_timeout() => LocalizedMessage::new(
            "انتهت مهلة الاتصال",
            "استغرق الخادم وقتاً طويلاً للرد. حاول مرة أخرى.",
        ),
        ClientError::Http(_) => LocalizedMessage::new(
            "خطأ في الاتصال",
            "تعذر الوصول إلى الخادم. تحقق من اتصالك وحاول مرة أخرى.",
        ),
        ClientError::Unauthorized => LocalizedMessage::new(
            "انتهت الجلسة",
            "انتهت صلاحية جلستك. الرجاء تسجيل الدخول مرة أخرى.",
        ),
        ClientError::Forbidden(_) => LocalizedMessage::new(
            "غير مسموح",
            "ليس لديك صلاحية لتنفيذ هذا الإجراء.",
        ),
        ClientError::NotFound(_) => LocalizedMessage::new(
            "غير موجود",
            "السلة المطلوبة لم تعد موجودة.",
        ),
        ClientError::Validation(detail) => LocalizedMessage::new("طلب غير صالح", detail.clone()),
        ClientError::Api(message) => LocalizedMessage::new("فشل الطلب", message.clone()),
        ClientError::Stale => LocalizedMessage::new(
            "تم تجاوز الطلب",
            "حل طلب أحدث محل هذا الطلب.",
        ),
        ClientError::InvalidResponse(_) | ClientError::Serialization(_) => LocalizedMessage::new(
            "استجابة غير متوقعة",
            "أعاد الخادم بيانات تعذر على التطبيق قراءتها.",
        ),
        ClientError::Internal(_) => LocalizedMessage::new(
            "خطأ في الخادم",
            "حدث خطأ في الخادم. حاول مرة أخرى.",
        ),
    }
}
