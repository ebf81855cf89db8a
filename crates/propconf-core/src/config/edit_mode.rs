//! Who may change a configuration value.

/// Edit permission of a configuration value.
///
/// | Mode    | By user | By app (raw file values) |
/// |---------|---------|--------------------------|
/// | `User`  | yes     | yes                      |
/// | `App`   | no      | yes                      |
/// | `Never` | no      | no                       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    #[default]
    User,
    App,
    Never,
}

impl EditMode {
    /// `true` if the end user may change the value.
    pub fn is_by_user(self) -> bool {
        self == EditMode::User
    }

    /// `true` if the application may change the value, which includes
    /// applying a value read from a file.
    pub fn is_by_app(self) -> bool {
        self != EditMode::Never
    }
}

crate::convertible_enum!(EditMode { User => "USER", App => "APP", Never => "NONE" });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converters;

    #[test]
    fn test_permission_matrix() {
        assert!(EditMode::User.is_by_user() && EditMode::User.is_by_app());
        assert!(!EditMode::App.is_by_user() && EditMode::App.is_by_app());
        assert!(!EditMode::Never.is_by_user() && !EditMode::Never.is_by_app());
    }

    #[test]
    fn test_edit_mode_is_convertible() {
        let converters = Converters::new();
        assert_eq!(converters.to_string(&EditMode::Never).unwrap(), "NONE");
        assert_eq!(converters.from_string::<EditMode>("app").unwrap(), EditMode::App);
    }
}
