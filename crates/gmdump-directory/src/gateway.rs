//! Directory query gateway
//!
//! The only interface the membership resolver depends on. A network LDAP
//! client, a cached snapshot and a test double are interchangeable.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::entry::Entry;
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::Filter;

/// Search capability of a directory service.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Search the subtree rooted at `root` for entries matching `filter`.
    ///
    /// # Arguments
    /// * `root` - Subtree root, or the exact DN of a single object
    /// * `filter` - Predicate the returned entries must satisfy
    /// * `attributes` - Attributes to populate; others may be missing
    ///
    /// # Returns
    /// The matching entries (possibly none), or an error on any transport,
    /// protocol or query failure.
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>>;

    /// Display name used in logs.
    fn display_name(&self) -> &str {
        "directory"
    }
}

#[async_trait]
impl<G: DirectoryGateway + ?Sized> DirectoryGateway for &G {
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>> {
        (**self).search(root, filter, attributes).await
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }
}

#[async_trait]
impl<G: DirectoryGateway + ?Sized> DirectoryGateway for Arc<G> {
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>> {
        (**self).search(root, filter, attributes).await
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }
}

#[async_trait]
impl<G: DirectoryGateway + ?Sized> DirectoryGateway for Box<G> {
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>> {
        (**self).search(root, filter, attributes).await
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }
}

/// Directory snapshot held in memory.
///
/// Scopes searches to the subtree below the root DN, evaluates filters with
/// [`Filter::matches`] and projects the requested attributes. Entries are
/// returned in insertion order.
///
/// A root with nothing at or below it yields an empty result, unless
/// [`InMemoryDirectory::report_missing_roots`] is set, in which case it
/// fails with [`DirectoryError::NoSuchObject`] like an LDAP server does.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: Vec<Entry>,
    failing_roots: HashSet<String>,
    report_missing_roots: bool,
    search_count: AtomicUsize,
    searched_roots: Mutex<Vec<String>>,
}

impl InMemoryDirectory {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry using builder pattern.
    #[must_use]
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.insert(entry);
        self
    }

    /// Add an entry.
    pub fn insert(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Make every search rooted at `root` fail with a search error.
    #[must_use]
    pub fn fail_on(mut self, root: impl Into<String>) -> Self {
        self.failing_roots.insert(root.into().to_ascii_lowercase());
        self
    }

    /// Fail searches whose root has no entry at or below it.
    #[must_use]
    pub fn report_missing_roots(mut self) -> Self {
        self.report_missing_roots = true;
        self
    }

    /// Number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of searches served so far.
    pub fn search_count(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }

    /// Roots of all searches served so far, in call order.
    pub fn searched_roots(&self) -> Vec<String> {
        self.searched_roots
            .lock()
            .map(|roots| roots.clone())
            .unwrap_or_default()
    }

    fn record(&self, root: &str) {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut roots) = self.searched_roots.lock() {
            roots.push(root.to_string());
        }
    }
}

impl FromIterator<Entry> for InMemoryDirectory {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl DirectoryGateway for InMemoryDirectory {
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>> {
        self.record(root);

        if self.failing_roots.contains(&root.to_ascii_lowercase()) {
            return Err(DirectoryError::search_failed(
                root,
                "injected failure for search root",
            ));
        }

        let subtree: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|entry| in_subtree(entry.identity(), root))
            .collect();

        if subtree.is_empty() && self.report_missing_roots && !root.is_empty() {
            debug!(root = %root, "Search root does not exist");
            return Err(DirectoryError::no_such_object(root));
        }

        let found: Vec<Entry> = subtree
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .map(|entry| {
                if attributes.is_empty() {
                    entry.clone()
                } else {
                    entry.restricted_to(attributes)
                }
            })
            .collect();

        debug!(
            root = %root,
            filter = %filter,
            returned = found.len(),
            "In-memory search completed"
        );

        Ok(found)
    }

    fn display_name(&self) -> &str {
        "in-memory"
    }
}

/// Whether `dn` equals `root` or lies below it.
fn in_subtree(dn: &str, root: &str) -> bool {
    if root.is_empty() {
        return true;
    }
    let dn = dn.to_ascii_lowercase();
    let root = root.to_ascii_lowercase();
    dn == root || dn.ends_with(&format!(",{root}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_entry(
                Entry::new("cn=Staff,ou=Groups,dc=ex,dc=com")
                    .with_value("cn", "Staff")
                    .with("objectClass", ["top", "group"])
                    .with("member", ["cn=Alice,ou=Users,dc=ex,dc=com"]),
            )
            .with_entry(
                Entry::new("cn=Alice,ou=Users,dc=ex,dc=com")
                    .with_value("cn", "alice")
                    .with("objectClass", ["top", "person"])
                    .with_value("mail", "alice@ex.com"),
            )
            .with_entry(
                Entry::new("cn=Printer,ou=Devices,dc=ex,dc=com")
                    .with_value("cn", "printer")
                    .with("objectClass", ["top", "device"]),
            )
    }

    #[test]
    fn test_in_subtree() {
        assert!(in_subtree("cn=a,ou=x,dc=ex", "ou=x,dc=ex"));
        assert!(in_subtree("cn=a,ou=x,dc=ex", "CN=A,OU=X,DC=EX"));
        assert!(in_subtree("cn=a,ou=x,dc=ex", ""));
        assert!(!in_subtree("cn=a,ou=x,dc=ex", "ou=y,dc=ex"));
        // Suffix must start at a component boundary.
        assert!(!in_subtree("cn=a,ou=xx,dc=ex", "x,dc=ex"));
    }

    #[tokio::test]
    async fn test_subtree_group_search() {
        let dir = directory();
        let groups = dir
            .search("dc=ex,dc=com", &Filter::groups(), &["member".to_string()])
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].identity(), "cn=Staff,ou=Groups,dc=ex,dc=com");
        assert_eq!(groups[0].member_refs().len(), 1);
        // Only the requested attributes are populated.
        assert!(!groups[0].has("cn"));
    }

    #[tokio::test]
    async fn test_point_lookup() {
        let dir = directory();
        let dn = "cn=Alice,ou=Users,dc=ex,dc=com";
        let found = dir
            .search(dn, &Filter::membership_lookup(dn), &[])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_value("mail"), Some("alice@ex.com"));
    }

    #[tokio::test]
    async fn test_point_lookup_filters_other_classes() {
        let dir = directory();
        let dn = "cn=Printer,ou=Devices,dc=ex,dc=com";
        let found = dir
            .search(dn, &Filter::membership_lookup(dn), &[])
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let dir = directory();
        let dn = "cn=Ghost,ou=Users,dc=ex,dc=com";
        let found = dir
            .search(dn, &Filter::membership_lookup(dn), &[])
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_reported() {
        let dir = directory().report_missing_roots();
        let dn = "cn=Ghost,ou=Users,dc=ex,dc=com";
        let err = dir
            .search(dn, &Filter::membership_lookup(dn), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NoSuchObject { ref root } if root == dn));

        // An existing root with no matches is still an empty result.
        let found = dir
            .search("ou=Users,dc=ex,dc=com", &Filter::groups(), &[])
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let dir = directory().fail_on("CN=Alice,OU=Users,DC=ex,DC=com");
        let dn = "cn=Alice,ou=Users,dc=ex,dc=com";
        let err = dir
            .search(dn, &Filter::membership_lookup(dn), &[])
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "SEARCH_FAILED");
    }

    #[tokio::test]
    async fn test_search_bookkeeping() {
        let dir = directory();
        let _ = dir.search("dc=ex,dc=com", &Filter::groups(), &[]).await;
        let _ = dir.search("ou=Users,dc=ex,dc=com", &Filter::groups(), &[]).await;

        assert_eq!(dir.search_count(), 2);
        assert_eq!(
            dir.searched_roots(),
            vec!["dc=ex,dc=com", "ou=Users,dc=ex,dc=com"]
        );
    }

    #[tokio::test]
    async fn test_shared_gateway() {
        let dir: Arc<InMemoryDirectory> = Arc::new(directory());
        let boxed: Box<dyn DirectoryGateway> = Box::new(dir.clone());

        let found = boxed
            .search("dc=ex,dc=com", &Filter::groups(), &[])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(boxed.display_name(), "in-memory");
        assert_eq!(dir.search_count(), 1);
    }

    #[test]
    fn test_from_iterator() {
        let dir: InMemoryDirectory = vec![Entry::new("cn=a"), Entry::new("cn=b")]
            .into_iter()
            .collect();
        assert_eq!(dir.len(), 2);
        assert!(!dir.is_empty());
    }
}
