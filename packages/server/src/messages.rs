//! User-facing texts for identity failures.

use htmlive_common::AuthError;

/// Language of messages shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` header value. Unknown languages fall back to English.
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .map(|part| part.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .find_map(|tag| match tag.split('-').next() {
                Some("ru") => Some(Self::Ru),
                Some("en") => Some(Self::En),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Translate an identity error into a message for the sign-in form.
pub fn auth_message(err: &AuthError, locale: Locale) -> &'static str {
    match (err, locale) {
        (AuthError::InvalidCredential, Locale::En) => {
            "Wrong email or password. Try again or create an account."
        }
        (AuthError::InvalidCredential, Locale::Ru) => {
            "Неверный email или пароль. Попробуйте еще раз или зарегистрируйтесь."
        }
        (AuthError::EmailInUse, Locale::En) => "This email is already registered. Try signing in.",
        (AuthError::EmailInUse, Locale::Ru) => "Этот email уже зарегистрирован. Попробуйте войти.",
        (AuthError::WeakPassword, Locale::En) => "Password is too weak (at least 6 characters).",
        (AuthError::WeakPassword, Locale::Ru) => "Пароль слишком простой (минимум 6 символов).",
        (AuthError::InvalidEmail, Locale::En) => "Invalid email format.",
        (AuthError::InvalidEmail, Locale::Ru) => "Некорректный формат email.",
        (AuthError::Disabled, Locale::En) => "This account has been disabled.",
        (AuthError::Disabled, Locale::Ru) => "Аккаунт заблокирован.",
        (AuthError::TooManyRequests, Locale::En) => "Too many attempts. Try again later.",
        (AuthError::TooManyRequests, Locale::Ru) => "Слишком много попыток. Попробуйте позже.",
        (AuthError::Unknown(_), Locale::En) => {
            "Something went wrong while signing in. Check your details."
        }
        (AuthError::Unknown(_), Locale::Ru) => {
            "Произошла ошибка при авторизации. Проверьте данные."
        }
    }
}
