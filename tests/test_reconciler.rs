use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recipe_parser::{
    Fetcher, Filter, Ingredient, MemoryStore, ReadPolicy, Recipe, RecipeError, RecipeStore,
    Reconciler,
};

const BASE: &str = "https://www.budgetbytes.com";

/// Serves canned pages and records every URL it was asked for.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RecipeError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(html.clone().into_bytes()),
            None => Err(RecipeError::UpstreamStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

fn recipe_page(id: Option<&str>, canonical: &str, name: &str, ingredients: &[&str]) -> String {
    let id_attr = id
        .map(|id| format!(r#" data-recipe-id="{id}""#))
        .unwrap_or_default();
    let items: String = ingredients
        .iter()
        .map(|ingredient| {
            format!(
                r#"<li class="wprm-recipe-ingredient"><span class="wprm-recipe-ingredient-name">{ingredient}</span></li>"#
            )
        })
        .collect();

    format!(
        r#"
        <html>
        <head><link rel="canonical" href="{canonical}" /></head>
        <body>
            <div class="wprm-recipe-container"{id_attr}>
                <h2 class="wprm-recipe-name wprm-block-text-bold">{name}</h2>
                <ul class="wprm-recipe-ingredients">{items}</ul>
                <ul class="wprm-recipe-instructions">
                    <li class="wprm-recipe-instruction"><div>Cook everything.</div></li>
                </ul>
            </div>
        </body>
        </html>"#
    )
}

fn mashed_potatoes_url() -> String {
    format!("{BASE}/slow-cooker-mashed-potatoes/")
}

fn mashed_potatoes_page() -> String {
    recipe_page(
        Some("48761"),
        &mashed_potatoes_url(),
        "Slow Cooker Mashed Potatoes",
        &["russet potatoes", "butter"],
    )
}

fn setup(fetcher: FakeFetcher) -> (Arc<MemoryStore>, Arc<FakeFetcher>, Reconciler) {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(fetcher);
    let reconciler = Reconciler::new(store.clone(), fetcher.clone());
    (store, fetcher, reconciler)
}

#[tokio::test]
async fn test_get_miss_fetches_and_persists() {
    let (store, fetcher, reconciler) =
        setup(FakeFetcher::default().with_page(&mashed_potatoes_url(), mashed_potatoes_page()));

    let recipe = reconciler.get("Slow-Cooker-Mashed-Potatoes/").await.unwrap();
    assert_eq!(recipe.id, "48761");
    assert_eq!(recipe.url, mashed_potatoes_url());
    assert_eq!(store.records().await, vec![recipe.clone()]);

    // Second read is served from the store.
    let again = reconciler.get("slow-cooker-mashed-potatoes").await.unwrap();
    assert_eq!(again, recipe);
    assert_eq!(fetcher.calls(), vec![mashed_potatoes_url()]);
}

#[tokio::test]
async fn test_get_hit_does_not_fetch() {
    let stored = Recipe {
        id: "48761".to_string(),
        name: "Stored copy".to_string(),
        url: mashed_potatoes_url(),
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::with_records(vec![stored.clone()]));
    let fetcher = Arc::new(FakeFetcher::default());
    let reconciler = Reconciler::new(store, fetcher.clone());

    let recipe = reconciler.get("slow-cooker-mashed-potatoes").await.unwrap();
    assert_eq!(recipe, stored);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_get_read_only_does_not_persist() {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(
        FakeFetcher::default().with_page(&mashed_potatoes_url(), mashed_potatoes_page()),
    );
    let reconciler =
        Reconciler::new(store.clone(), fetcher.clone()).with_read_policy(ReadPolicy::ReadOnly);

    reconciler.get("slow-cooker-mashed-potatoes").await.unwrap();
    reconciler.get("slow-cooker-mashed-potatoes").await.unwrap();

    assert!(store.records().await.is_empty());
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_get_from_source_bypasses_store() {
    let stored = Recipe {
        id: "48761".to_string(),
        name: "Stale".to_string(),
        url: mashed_potatoes_url(),
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::with_records(vec![stored.clone()]));
    let fetcher = Arc::new(
        FakeFetcher::default().with_page(&mashed_potatoes_url(), mashed_potatoes_page()),
    );
    let reconciler = Reconciler::new(store.clone(), fetcher.clone());

    let recipe = reconciler
        .get_from_source("slow-cooker-mashed-potatoes")
        .await
        .unwrap();
    assert_eq!(recipe.name, "Slow Cooker Mashed Potatoes");
    assert_eq!(fetcher.calls().len(), 1);
    // The stored record is left untouched.
    assert_eq!(store.records().await, vec![stored]);
}

#[tokio::test]
async fn test_create_twice_fails_without_second_fetch() {
    let (store, fetcher, reconciler) =
        setup(FakeFetcher::default().with_page(&mashed_potatoes_url(), mashed_potatoes_page()));

    let created = reconciler.create("slow-cooker-mashed-potatoes").await.unwrap();
    assert_eq!(created.id, "48761");
    assert_eq!(
        created.ingredients,
        vec![
            Ingredient {
                name: "russet potatoes".to_string(),
                ..Default::default()
            },
            Ingredient {
                name: "butter".to_string(),
                ..Default::default()
            },
        ]
    );

    let err = reconciler
        .create("Slow-Cooker%2DMashed-Potatoes/")
        .await
        .unwrap_err();
    assert!(matches!(err, RecipeError::AlreadyExists { ref url } if *url == mashed_potatoes_url()));
    assert!(err.is_client_error());
    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(store.records().await.len(), 1);
}

#[tokio::test]
async fn test_create_without_recipe_id_is_rejected() {
    let url = format!("{BASE}/mystery-soup/");
    let page = recipe_page(None, &url, "Mystery Soup", &["water"]);
    let (store, _fetcher, reconciler) = setup(FakeFetcher::default().with_page(&url, page));

    let err = reconciler.create("mystery-soup").await.unwrap_err();
    assert!(matches!(err, RecipeError::MissingIdentifier { .. }));
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_get_without_recipe_id_is_returned_but_not_cached() {
    let url = format!("{BASE}/mystery-soup/");
    let page = recipe_page(None, &url, "Mystery Soup", &["water"]);
    let (store, _fetcher, reconciler) = setup(FakeFetcher::default().with_page(&url, page));

    let recipe = reconciler.get("mystery-soup").await.unwrap();
    assert_eq!(recipe.id, "");
    assert_eq!(recipe.name, "Mystery Soup");
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_create_propagates_transport_failure() {
    let (store, fetcher, reconciler) = setup(FakeFetcher::default());

    let err = reconciler.create("does-not-exist").await.unwrap_err();
    assert!(matches!(err, RecipeError::UpstreamStatus { status: 404, .. }));
    assert!(err.is_transport());
    assert_eq!(fetcher.calls(), vec![format!("{BASE}/does-not-exist/")]);
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_create_unparseable_page() {
    let url = format!("{BASE}/about/");
    let page = "<html><body><h1>About Budget Bytes</h1></body></html>".to_string();
    let (store, _fetcher, reconciler) = setup(FakeFetcher::default().with_page(&url, page));

    let err = reconciler.create("about").await.unwrap_err();
    assert!(matches!(err, RecipeError::ContainerNotFound));
    assert!(err.is_unparseable());
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_update_refetches_from_stored_url_and_replaces_whole_record() {
    // The page has since moved its canonical link; the stored URL is still
    // where it is fetched from.
    let stored_url = format!("{BASE}/old-mashed-potatoes/");
    let page = recipe_page(
        Some("48761"),
        &mashed_potatoes_url(),
        "Slow Cooker Mashed Potatoes",
        &["yukon gold potatoes"],
    );
    let stale = Recipe {
        id: "48761".to_string(),
        name: "Old Mashed Potatoes".to_string(),
        url: stored_url.clone(),
        image: "https://www.budgetbytes.com/old.jpg".to_string(),
        ingredients: vec![
            Ingredient {
                name: "potatoes".to_string(),
                ..Default::default()
            },
            Ingredient {
                name: "cream cheese".to_string(),
                ..Default::default()
            },
        ],
        instructions: vec!["Old step one.".to_string(), "Old step two.".to_string()],
    };
    let store = Arc::new(MemoryStore::with_records(vec![stale]));
    let fetcher = Arc::new(FakeFetcher::default().with_page(&stored_url, page));
    let reconciler = Reconciler::new(store.clone(), fetcher.clone());

    let updated = reconciler.update("48761").await.unwrap();

    assert_eq!(fetcher.calls(), vec![stored_url.clone()]);
    assert_eq!(updated.url, stored_url);
    assert_eq!(updated.name, "Slow Cooker Mashed Potatoes");
    assert_eq!(updated.image, "");
    assert_eq!(updated.ingredients.len(), 1);
    assert_eq!(updated.instructions, vec!["Cook everything."]);
    assert_eq!(store.records().await, vec![updated]);
}

#[tokio::test]
async fn test_update_unknown_id() {
    let (_store, fetcher, reconciler) = setup(FakeFetcher::default());

    let err = reconciler.update("404404").await.unwrap_err();
    assert!(matches!(err, RecipeError::NotFound { ref id } if id == "404404"));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let stored = Recipe {
        id: "48761".to_string(),
        url: mashed_potatoes_url(),
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::with_records(vec![stored]));
    let reconciler = Reconciler::new(store.clone(), Arc::new(FakeFetcher::default()));

    assert!(reconciler.delete("48761").await.unwrap());
    assert!(!reconciler.delete("48761").await.unwrap());
    assert!(store
        .find_one(&Filter::id("48761"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_get_miss_replaces_record_stored_under_old_slug() {
    // The site renamed the page; the id is unchanged.
    let old = Recipe {
        id: "48761".to_string(),
        name: "Crock Pot Mashed Potatoes".to_string(),
        url: format!("{BASE}/crock-pot-mashed-potatoes/"),
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::with_records(vec![old]));
    let fetcher = Arc::new(
        FakeFetcher::default().with_page(&mashed_potatoes_url(), mashed_potatoes_page()),
    );
    let reconciler = Reconciler::new(store.clone(), fetcher.clone());

    let recipe = reconciler.get("slow-cooker-mashed-potatoes").await.unwrap();

    assert_eq!(recipe.url, mashed_potatoes_url());
    assert_eq!(store.records().await, vec![recipe]);
    assert_eq!(fetcher.calls().len(), 1);
}
