use super::check_length;
use crate::error::DomainError;

pub type TagId = i32;

pub const TAG_NAME_MAX_CHARS: usize = 50;

/// Tag entity - a reusable label shared by many posts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Validate requested tag names and collapse exact duplicates.
///
/// First-seen order is kept so that tags are looked up and created in the
/// order the client listed them.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, DomainError> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        check_length("tag", name, TAG_NAME_MAX_CHARS)?;
        if !unique.iter().any(|seen| seen == name) {
            unique.push(name.to_string());
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_collapse_in_first_seen_order() {
        let names = normalize_tag_names(&["web", "go", "web", "go"]).unwrap();
        assert_eq!(names, vec!["web".to_string(), "go".to_string()]);
    }

    #[test]
    fn names_differing_in_case_are_kept_apart() {
        let names = normalize_tag_names(&["Rust", "rust"]).unwrap();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn empty_and_oversized_names_are_rejected() {
        assert!(matches!(
            normalize_tag_names(&[""]),
            Err(DomainError::Validation(_))
        ));
        let long = "x".repeat(TAG_NAME_MAX_CHARS + 1);
        assert!(matches!(
            normalize_tag_names(&[long]),
            Err(DomainError::Validation(_))
        ));
        let exact = "x".repeat(TAG_NAME_MAX_CHARS);
        assert!(normalize_tag_names(&[exact]).is_ok());
    }
}
