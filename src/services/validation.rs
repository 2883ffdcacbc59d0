//! Input validation and slug helpers

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ServiceError;
use crate::db::repositories::SlugLookup;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Maximum length of a contact message body, in characters
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Minimum password length, in characters
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Check the shape of an email address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255 && EMAIL_RE.is_match(email)
}

/// Trim `value` and reject it when empty or longer than `max_chars`.
pub fn required(value: &str, field: &str, max_chars: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim and lowercase an email, rejecting malformed addresses.
pub fn email(value: &str) -> Result<String, ServiceError> {
    let email = value.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ServiceError::validation("Invalid email address"));
    }
    Ok(email)
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases ASCII letters, keeps digits and non-ASCII letters, and folds
/// every run of other characters into a single hyphen.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        let lowered: String = if c.is_alphanumeric() {
            c.to_lowercase().filter(|l| l.is_alphanumeric()).collect()
        } else {
            String::new()
        };

        if lowered.is_empty() {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.push_str(&lowered);
    }

    slug
}

/// Resolve the slug for a new row.
///
/// Uses the normalized explicit slug when given, otherwise one derived from
/// `title`. A taken slug is suffixed `-2`, `-3`... until unused.
pub async fn slug_for_create<R>(
    repo: &R,
    explicit: Option<&str>,
    title: &str,
) -> Result<String, ServiceError>
where
    R: SlugLookup + ?Sized,
{
    let base = match explicit.filter(|s| !s.trim().is_empty()) {
        Some(explicit) => {
            let slug = generate_slug(explicit);
            if slug.is_empty() {
                return Err(ServiceError::validation("Slug must contain letters or digits"));
            }
            slug
        }
        None => match generate_slug(title) {
            s if s.is_empty() => "item".to_string(),
            s => s,
        },
    };
    Ok(unique_slug(repo, &base).await?)
}

/// Resolve the slug for an update of row `id`.
///
/// Returns `None` when the slug is unchanged. A slug taken by another row is
/// a conflict.
pub async fn slug_for_update<R>(
    repo: &R,
    id: i64,
    current: &str,
    requested: Option<&str>,
) -> Result<Option<String>, ServiceError>
where
    R: SlugLookup + ?Sized,
{
    let Some(requested) = requested else {
        return Ok(None);
    };
    let slug = generate_slug(requested);
    if slug.is_empty() {
        return Err(ServiceError::validation("Slug must contain letters or digits"));
    }
    if slug == current {
        return Ok(None);
    }
    if repo.exists_by_slug(&slug, Some(id)).await? {
        return Err(ServiceError::conflict(format!("Slug '{}' is already in use", slug)));
    }
    Ok(Some(slug))
}

async fn unique_slug<R>(repo: &R, base: &str) -> Result<String>
where
    R: SlugLookup + ?Sized,
{
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while repo.exists_by_slug(&candidate, None).await? {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    Ok(candidate)
}

/// Apply an optional-field update: absent keeps `current`, blank clears it.
pub fn merge_optional(current: Option<String>, update: Option<String>) -> Option<String> {
    match update {
        None => current,
        Some(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashSet;

    struct TakenSlugs(HashSet<&'static str>);

    #[async_trait]
    impl SlugLookup for TakenSlugs {
        async fn exists_by_slug(&self, slug: &str, _exclude_id: Option<i64>) -> Result<bool> {
            Ok(self.0.contains(slug))
        }
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("  5G & Fiber: 2025!  "), "5g-fiber-2025");
        assert_eq!(generate_slug("a--b__c"), "a-b-c");
        assert_eq!(generate_slug("!!!"), "");
        assert_eq!(generate_slug("Café Über"), "café-über");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@zuree.com"));
        assert!(is_valid_email("first.last+tag@mail.zuree.co.ng"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("ada.zuree.com"));
        assert!(!is_valid_email("ada@zuree"));
        assert!(!is_valid_email("a b@zuree.com"));
    }

    #[test]
    fn test_required() {
        assert_eq!(required("  Lagos ", "location", 10).unwrap(), "Lagos");
        assert!(matches!(required("   ", "location", 10), Err(ServiceError::Validation(_))));
        assert!(matches!(required("abcdef", "code", 3), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_merge_optional() {
        let current = Some("old".to_string());
        assert_eq!(merge_optional(current.clone(), None), current);
        assert_eq!(merge_optional(current.clone(), Some("".into())), None);
        assert_eq!(merge_optional(None, Some(" new ".into())), Some("new".into()));
    }

    #[tokio::test]
    async fn test_slug_for_create_appends_suffix() {
        let repo = TakenSlugs(["fiber-launch", "fiber-launch-2"].into_iter().collect());
        let slug = slug_for_create(&repo, None, "Fiber Launch").await.unwrap();
        assert_eq!(slug, "fiber-launch-3");
    }

    #[tokio::test]
    async fn test_slug_for_create_explicit_duplicate_is_suffixed() {
        let repo = TakenSlugs(["taken"].into_iter().collect());
        let slug = slug_for_create(&repo, Some("Taken"), "Anything").await.unwrap();
        assert_eq!(slug, "taken-2");

        let result = slug_for_create(&repo, Some("!!!"), "Anything").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_slug_for_create_symbol_title_falls_back() {
        let repo = TakenSlugs(HashSet::new());
        assert_eq!(slug_for_create(&repo, None, "???").await.unwrap(), "item");
    }

    #[tokio::test]
    async fn test_slug_for_update() {
        let repo = TakenSlugs(["other"].into_iter().collect());
        assert_eq!(slug_for_update(&repo, 1, "mine", None).await.unwrap(), None);
        assert_eq!(slug_for_update(&repo, 1, "mine", Some("mine")).await.unwrap(), None);
        assert_eq!(
            slug_for_update(&repo, 1, "mine", Some("New Name")).await.unwrap(),
            Some("new-name".to_string())
        );
        assert!(matches!(
            slug_for_update(&repo, 1, "mine", Some("other")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_slug_is_url_safe(title in "\\PC{0,60}") {
            let slug = generate_slug(&title);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c == '-' || c.is_alphanumeric()));
            prop_assert!(!slug.chars().any(|c| c.is_ascii_uppercase()));
        }

        #[test]
        fn prop_slug_is_idempotent(title in "[A-Za-z0-9 _!?.-]{0,40}") {
            let once = generate_slug(&title);
            prop_assert_eq!(generate_slug(&once), once.clone());
        }

        #[test]
        fn prop_generated_emails_validate(user in "[a-z0-9]{1,12}", domain in "[a-z]{1,10}", tld in "[a-z]{2,4}") {
            let address = format!("{}@{}.{}", user, domain, tld);
            prop_assert!(is_valid_email(&address));
        }
    }
}
