use thiserror::Error;

/// Errors raised inside a viewer session.
///
/// None of these are fatal: the shell turns them into an inline message and
/// the session stays usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Failed to fetch page {page}: {reason}")]
    PageFetch { page: usize, reason: String },

    #[error("Failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },

    #[error("{title} is locked")]
    Locked { title: String },

    #[error("Invalid viewer configuration: {0}")]
    Config(String),
}

impl ViewerError {
    /// Page the error is scoped to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            ViewerError::PageFetch { page, .. } | ViewerError::Render { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let err = ViewerError::Load("file not found".to_string());
        assert_eq!(err.to_string(), "Failed to load document: file not found");

        let err = ViewerError::Locked {
            title: "Dune".to_string(),
        };
        assert_eq!(err.to_string(), "Dune is locked");
    }

    #[test]
    fn page_scoped_errors_report_their_page() {
        let err = ViewerError::PageFetch {
            page: 4,
            reason: "missing object".to_string(),
        };
        assert_eq!(err.page(), Some(4));
        assert_eq!(ViewerError::Load(String::new()).page(), None);
    }
}
