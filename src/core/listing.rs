use crate::core::client::{ListFolderResult, StorageClient};
use crate::error::Result;
use tracing::debug;

enum Cursor {
    Start,
    Continue(String),
    Done,
}

/// Pages of a folder listing, fetched lazily.
///
/// The first call to `next` issues the initial listing request, later calls
/// follow the continuation cursor until the service reports no more pages.
/// The sequence ends after the last page or after the first error and can
/// not be restarted.
pub struct ListingPages<'a, C: StorageClient + ?Sized> {
    client: &'a C,
    path: &'a str,
    recursive: bool,
    cursor: Cursor,
}

impl<'a, C: StorageClient + ?Sized> ListingPages<'a, C> {
    pub fn new(client: &'a C, path: &'a str, recursive: bool) -> Self {
        Self {
            client,
            path,
            recursive,
            cursor: Cursor::Start,
        }
    }
}

impl<C: StorageClient + ?Sized> Iterator for ListingPages<'_, C> {
    type Item = Result<ListFolderResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return None,
            Cursor::Start => {
                debug!(path = self.path, recursive = self.recursive, "listing folder");
                self.client.list_folder(self.path, self.recursive)
            }
            Cursor::Continue(cursor) => {
                debug!(path = self.path, "fetching continuation page");
                self.client.list_folder_continue(&cursor)
            }
        };

        if let Ok(page) = &result {
            debug!(entries = page.entries.len(), has_more = page.has_more, "listing page received");
            if page.has_more {
                self.cursor = Cursor::Continue(page.cursor.clone());
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::mock::{file, folder, MockClient};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_follows_cursor_until_exhausted() {
        let client = MockClient::new()
            .with_page(vec![file("/a/1.txt", 1)])
            .with_page(vec![folder("/a/b")])
            .with_page(vec![file("/a/b/2.txt", 2)]);

        let pages: Vec<_> = ListingPages::new(&client, "/a", true)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(*client.listed.borrow(), vec![("/a".to_string(), true)]);
        assert_eq!(
            *client.continued.borrow(),
            vec!["cursor-1".to_string(), "cursor-2".to_string()]
        );
    }

    #[test]
    fn test_stops_after_error() {
        let client = MockClient::new()
            .with_page(vec![file("/a/1.txt", 1)])
            .with_page(vec![file("/a/2.txt", 1)])
            .with_page(vec![file("/a/3.txt", 1)])
            .failing_page(1);

        let mut pages = ListingPages::new(&client, "/a", true);
        assert!(pages.next().unwrap().is_ok());
        assert!(pages.next().unwrap().is_err());
        assert!(pages.next().is_none());
        assert_eq!(client.continued.borrow().len(), 1);
    }

    #[test]
    fn test_single_page() {
        let client = MockClient::new().with_page(vec![]);
        let mut pages = ListingPages::new(&client, "/", false);
        assert!(pages.next().unwrap().unwrap().entries.is_empty());
        assert!(pages.next().is_none());
        assert!(pages.next().is_none());
    }
}
