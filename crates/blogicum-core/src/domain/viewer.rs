use super::UserId;

/// Whoever issued the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(UserId),
}

impl Viewer {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the given user.
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Option<UserId>> for Viewer {
    fn from(id: Option<UserId>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_nobody() {
        assert!(!Viewer::Anonymous.is(1));
        assert_eq!(Viewer::from(None), Viewer::Anonymous);
    }

    #[test]
    fn test_user_matches_own_id_only() {
        let viewer = Viewer::from(Some(7));
        assert!(viewer.is(7));
        assert!(!viewer.is(8));
    }
}
