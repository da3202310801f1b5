//! Reviews in both directions: users about companies and companies about
//! users. The two tables share one row shape and one set of queries.

pub mod handlers;
pub mod queries;

use crate::errors::AppError;

pub const MAX_CONTENT_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentBoard {
    /// A user writing about a company; the author is `user_id`.
    User,
    /// A company writing about a user; the author is `company_id`.
    Company,
}

impl CommentBoard {
    pub fn table(self) -> &'static str {
        match self {
            CommentBoard::User => "user_comments",
            CommentBoard::Company => "company_comments",
        }
    }

    /// Column the listing filter applies to.
    pub fn filter_column(self) -> &'static str {
        match self {
            CommentBoard::User => "user_id",
            CommentBoard::Company => "company_id",
        }
    }
}

pub fn check_content(content: &str) -> Result<&str, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::invalid("content", "This field may not be blank."));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::invalid(
            "content",
            format!("Ensure this field has no more than {MAX_CONTENT_LEN} characters."),
        ));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boards_filter_on_author_column() {
        assert_eq!(CommentBoard::User.table(), "user_comments");
        assert_eq!(CommentBoard::User.filter_column(), "user_id");
        assert_eq!(CommentBoard::Company.table(), "company_comments");
        assert_eq!(CommentBoard::Company.filter_column(), "company_id");
    }

    #[test]
    fn test_content_is_trimmed_and_bounded() {
        assert_eq!(check_content("  great team ").unwrap(), "great team");
        assert!(check_content("   ").is_err());
        assert!(check_content(&"x".repeat(MAX_CONTENT_LEN + 1)).is_err());
    }
}
