use crate::api::{ApiClient, FetchError, SingleFlight};
use crate::data::schema::{validate_required, RowSchema};
use crate::notice::NoticeQueue;
use crate::view::TableViewController;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Fetches one list resource through the single-flight policy. Cheap to
/// clone, so a caller can start loads without holding the page.
#[derive(Clone)]
pub struct PageLoader {
    client: ApiClient,
    flight: Arc<SingleFlight>,
    path: String,
    pointer: Option<String>,
}

impl PageLoader {
    pub fn new(client: ApiClient, flight: Arc<SingleFlight>, path: impl Into<String>) -> Self {
        Self {
            client,
            flight,
            path: path.into(),
            pointer: None,
        }
    }

    /// Rows live inside the response object at this JSON pointer
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<Value>, FetchError> {
        let client = self.client.clone();
        let path = self.path.clone();
        let pointer = self.pointer.clone();
        self.flight
            .run(&self.path, async move {
                client.fetch_rows(&path, pointer.as_deref()).await
            })
            .await
    }
}

/// A list page: the table controller plus its data source, loading flag and
/// notices
pub struct ListPage {
    controller: TableViewController,
    schema: RowSchema,
    loader: PageLoader,
    loading: bool,
    notices: NoticeQueue,
}

impl ListPage {
    pub fn new(controller: TableViewController, schema: RowSchema, loader: PageLoader) -> Self {
        Self {
            controller,
            schema,
            loader,
            loading: false,
            notices: NoticeQueue::new(),
        }
    }

    pub fn controller(&self) -> &TableViewController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TableViewController {
        &mut self.controller
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    /// Fetch, validate and show the rows. Returns true when the data was
    /// replaced; on failure the previous rows stay.
    pub async fn refresh(&mut self) -> bool {
        self.loading = true;
        let result = self.loader.load().await;
        self.apply(result)
    }

    /// Finish a load started elsewhere (e.g. through a cloned loader)
    pub fn apply(&mut self, result: Result<Vec<Value>, FetchError>) -> bool {
        self.loading = false;

        let rows = match result {
            Ok(rows) => rows,
            Err(FetchError::Superseded) => {
                debug!(target: "table_view", "Dropping superseded load of {}", self.loader.path());
                return false;
            }
            Err(e) => {
                self.notices
                    .error(format!("Failed to load {}: {}", self.loader.path(), e));
                return false;
            }
        };

        match self.schema.from_json_rows(&rows) {
            Ok(table) => {
                self.controller.set_data(table);
                true
            }
            Err(e) => {
                self.notices
                    .error(format!("Invalid data from {}: {}", self.loader.path(), e));
                false
            }
        }
    }

    /// Check a form before it is submitted; a warning notice names every
    /// missing field
    pub fn validate_form(&mut self, form: &Map<String, Value>, required: &[&str]) -> bool {
        match validate_required(form, required) {
            Ok(()) => true,
            Err(e) => {
                self.notices.warning(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataType;
    use crate::notice::NoticeLevel;
    use crate::prefs::MemoryStore;
    use crate::session::Session;
    use crate::view::{ColumnDescriptor, TableOptions};
    use serde_json::json;

    fn page(base_url: &str) -> ListPage {
        let controller = TableViewController::new(
            vec![ColumnDescriptor::new("name", "Name")],
            Arc::new(MemoryStore::new()),
            "assets",
            TableOptions::default(),
        );
        let schema = RowSchema::new("assets").required_field("name", DataType::String);
        let client = ApiClient::new(Arc::new(Session::new(base_url)));
        let loader = PageLoader::new(client, Arc::new(SingleFlight::new()), "/pms/assets.json");
        ListPage::new(controller, schema, loader)
    }

    #[test]
    fn test_apply_keeps_prior_data_on_failure() {
        let mut page = page("http://localhost");
        assert!(page.apply(Ok(vec![json!({"id": 1, "name": "Chiller"})])));
        assert_eq!(page.controller().total_count(), 1);

        assert!(!page.apply(Err(FetchError::Http {
            status: 503,
            body: "down".to_string()
        })));
        assert_eq!(page.controller().total_count(), 1);
        assert_eq!(page.notices().latest().unwrap().level, NoticeLevel::Error);

        assert!(!page.apply(Ok(vec![json!({"id": 2})])));
        assert_eq!(page.controller().total_count(), 1);
        assert!(page.notices().latest().unwrap().message.contains("name"));
    }

    #[test]
    fn test_superseded_is_silent() {
        let mut page = page("http://localhost");
        assert!(!page.apply(Err(FetchError::Superseded)));
        assert!(page.notices().is_empty());
        assert!(!page.is_loading());
    }

    #[test]
    fn test_validate_form() {
        let mut page = page("http://localhost");
        let form = json!({"name": "", "site": "HQ"});
        assert!(!page.validate_form(form.as_object().unwrap(), &["name", "site"]));
        assert_eq!(page.notices().latest().unwrap().level, NoticeLevel::Warning);
        assert!(page.validate_form(form.as_object().unwrap(), &["site"]));
    }

    #[tokio::test]
    async fn test_refresh_against_unreachable_backend() {
        let mut page = page("http://127.0.0.1:1");
        assert!(!page.refresh().await);
        assert!(!page.is_loading());
        assert!(page
            .notices()
            .latest()
            .unwrap()
            .message
            .starts_with("Failed to load /pms/assets.json"));
    }
}
