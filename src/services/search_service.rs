// src/services/search_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SearchStore,
    models::{
        inventory::{ItemDetail, ItemView, UsefulLifeView},
        search::{ItemFilter, ProductFilter, QueryPlan},
    },
};

// ---
// Planejador da busca avançada
// ---
// Pipeline único, com saída antecipada:
//   nomes (categoria/fabricante) -> ids -> produtos -> itens -> filtro onShelf em memória.
// Passos sem predicado são pulados.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn SearchStore>,
    deadline: Duration,
}

impl SearchService {
    pub fn new(store: Arc<dyn SearchStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub async fn advanced_search(&self, params: &HashMap<String, String>) -> Result<Vec<ItemView>, AppError> {
        let plan = QueryPlan::from_query(params)?;
        let items = self.execute(&plan).await?;
        Ok(items.iter().map(ItemDetail::full).collect())
    }

    /// Roda o plano sob o prazo configurado.
    pub async fn execute(&self, plan: &QueryPlan) -> Result<Vec<ItemDetail>, AppError> {
        tokio::time::timeout(self.deadline, self.resolve(plan))
            .await
            .map_err(|_| {
                tracing::warn!("⏱️ Busca excedeu o prazo de {:?}", self.deadline);
                AppError::Timeout
            })?
    }

    async fn resolve(&self, plan: &QueryPlan) -> Result<Vec<ItemDetail>, AppError> {
        let mut item_filter = plan.item.clone();

        if plan.needs_products() {
            // 1. Categoria e fabricante não dependem um do outro: em paralelo
            let (category_ids, manufacturer_ids) = tokio::try_join!(
                self.ids_for(plan.category.as_deref(), Axis::Category),
                self.ids_for(plan.manufacturer.as_deref(), Axis::Manufacturer)
            )?;

            // Nome informado que não casou nada: nenhum item pode passar
            if is_empty_axis(&category_ids) || is_empty_axis(&manufacturer_ids) {
                return Err(AppError::NoItemsFound);
            }

            // 2-3. Todos os predicados de produto em AND
            let product_filter = ProductFilter {
                category_ids,
                manufacturer_ids,
                ..plan.product.clone()
            };
            let product_ids = self.store.product_ids(&product_filter).await?;
            if product_ids.is_empty() {
                return Err(AppError::NoItemsFound);
            }
            item_filter.product_ids = Some(product_ids);
        }

        // 4. Itens já resolvidos
        let mut items = self.store.items(&item_filter).await?;

        // 5. onShelf é derivado: filtro em memória
        if let Some(wanted) = plan.on_shelf {
            items.retain(|item| item.is_on_shelf() == wanted);
        }

        // 6. Vazio é erro do cliente, não do servidor
        if items.is_empty() {
            return Err(AppError::NoItemsFound);
        }
        Ok(items)
    }

    async fn ids_for(&self, name: Option<&str>, axis: Axis) -> Result<Option<Vec<Uuid>>, AppError> {
        let Some(name) = name else {
            return Ok(None);
        };
        let ids = match axis {
            Axis::Category => self.store.category_ids_by_name(name).await?,
            Axis::Manufacturer => self.store.manufacturer_ids_by_name(name).await?,
        };
        Ok(Some(ids))
    }

    // ---
    // Listagens que também passam pelo store de busca
    // ---
    pub async fn all_items(&self) -> Result<Vec<ItemView>, AppError> {
        let items = self.store.items(&ItemFilter::default()).await?;
        Ok(items.iter().map(ItemDetail::full).collect())
    }

    pub async fn items_on_shelf(&self, on_shelf: bool) -> Result<Vec<ItemView>, AppError> {
        let items = self.store.items(&ItemFilter::default()).await?;
        Ok(items
            .iter()
            .filter(|item| item.is_on_shelf() == on_shelf)
            .map(ItemDetail::full)
            .collect())
    }

    pub async fn useful_life(&self) -> Result<Vec<UsefulLifeView>, AppError> {
        let items = self.store.items(&ItemFilter::default()).await?;
        Ok(items.iter().map(ItemDetail::with_useful_life).collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Category,
    Manufacturer,
}

fn is_empty_axis(ids: &Option<Vec<Uuid>>) -> bool {
    ids.as_ref().is_some_and(|ids| ids.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory_store::MemoryStore,
        models::search::SearchField,
    };
    use async_trait::async_trait;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    // Electronics/Acme/Widget W-100, um item em Denver (fora) e um em Austin
    fn warehouse_scenario() -> (Arc<MemoryStore>, i64, i64) {
        let mut store = MemoryStore::new();
        let electronics = store.add_category("Electronics");
        let acme = store.add_manufacturer("Acme");
        let widget = store.add_product("Widget", Some("W-100"), electronics, acme, false);
        let denver = store.add_item(100, widget, "Denver");
        store.add_item(200, widget, "Austin");
        store.check_out(denver, 1);
        (Arc::new(store), 100, 200)
    }

    fn service(store: Arc<MemoryStore>) -> SearchService {
        SearchService::new(store, Duration::from_secs(5))
    }

    async fn barcodes(svc: &SearchService, pairs: &[(&str, &str)]) -> Result<Vec<i64>, AppError> {
        let items = svc.advanced_search(&query(pairs)).await?;
        Ok(items.iter().map(|i| i.barcode).collect())
    }

    #[tokio::test]
    async fn end_to_end_category_warehouse_and_shelf_state() {
        let (store, denver, austin) = warehouse_scenario();
        let svc = service(store);

        let found = barcodes(&svc, &[("category", "Electronics"), ("warehouse", "Denver"), ("onShelf", "false")])
            .await
            .unwrap();
        assert_eq!(found, vec![denver]);

        let found = barcodes(&svc, &[("category", "Electronics"), ("onShelf", "true")]).await.unwrap();
        assert_eq!(found, vec![austin]);
    }

    #[tokio::test]
    async fn on_shelf_is_applied_after_the_store_filter() {
        let (store, _, _) = warehouse_scenario();
        let svc = service(store);

        // O item de Denver casa o armazém mas está fora da prateleira
        let err = barcodes(&svc, &[("warehouse", "Denver"), ("onShelf", "true")]).await.unwrap_err();
        assert!(matches!(err, AppError::NoItemsFound));
    }

    #[tokio::test]
    async fn item_returned_after_check_out_is_back_on_shelf() {
        let mut store = MemoryStore::new();
        let tools = store.add_category("Tools");
        let acme = store.add_manufacturer("Acme");
        let drill = store.add_product("Drill", None, tools, acme, false);
        let returned = store.add_item(300, drill, "Denver");
        let still_out = store.add_item(301, drill, "Denver");
        store.check_out(returned, 1);
        store.check_in(returned, 2);
        store.check_out(still_out, 2);
        store.check_in(still_out, 1);
        let svc = service(Arc::new(store));

        let items = svc
            .advanced_search(&query(&[("warehouse", "Denver"), ("onShelf", "true")]))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].barcode, 300);
        assert!(!items[0].is_checked_out);
        assert_eq!(items[0].checked_in.len(), 1);

        assert_eq!(
            barcodes(&svc, &[("warehouse", "Denver"), ("onShelf", "false")]).await.unwrap(),
            vec![301]
        );
    }

    #[tokio::test]
    async fn product_fields_are_combined_with_and() {
        let mut store = MemoryStore::new();
        let tools = store.add_category("Tools");
        let acme = store.add_manufacturer("Acme");
        let a = store.add_product("Drill", Some("ABC123"), tools, acme, true);
        let b = store.add_product("Saw", Some("ABC123"), tools, acme, false);
        let c = store.add_product("Tape", Some("XYZ"), tools, acme, true);
        store.add_item(1, a, "Denver");
        store.add_item(2, b, "Denver");
        store.add_item(3, c, "Denver");
        let svc = service(Arc::new(store));

        let by_model = barcodes(&svc, &[("model", "ABC123")]).await.unwrap();
        let by_flag = barcodes(&svc, &[("consummable", "true")]).await.unwrap();
        let both = barcodes(&svc, &[("model", "ABC123"), ("consummable", "true")]).await.unwrap();

        let intersection: Vec<i64> = by_model.iter().copied().filter(|b| by_flag.contains(b)).collect();
        assert_eq!(both, intersection);
        assert_eq!(both, vec![1]);
    }

    #[tokio::test]
    async fn two_hop_resolution_intersects_category_and_manufacturer() {
        let mut store = MemoryStore::new();
        let tools = store.add_category("Tools");
        let acme = store.add_manufacturer("Acme");
        let other = store.add_manufacturer("Bolt Co");
        let p1 = store.add_product("Hammer", None, tools, acme, false);
        let p2 = store.add_product("Wrench", None, tools, other, false);
        store.add_item(11, p1, "Austin");
        store.add_item(22, p2, "Austin");
        let svc = service(Arc::new(store));

        let found = barcodes(&svc, &[("category", "Tools"), ("manufacturer", "Acme")]).await.unwrap();
        assert_eq!(found, vec![11]);
    }

    #[tokio::test]
    async fn unmatched_name_yields_no_items_instead_of_being_ignored() {
        let (store, _, _) = warehouse_scenario();
        let svc = service(store.clone());

        let err = barcodes(&svc, &[("manufacturer", "NoSuchName")]).await.unwrap_err();
        assert!(matches!(err, AppError::NoItemsFound));
        // Saída antecipada: nem produtos nem itens foram consultados
        assert_eq!(MemoryStore::calls(&store.product_lookups), 0);
        assert_eq!(MemoryStore::calls(&store.item_lookups), 0);
    }

    #[tokio::test]
    async fn item_only_queries_skip_product_resolution() {
        let (store, _, austin) = warehouse_scenario();
        let svc = service(store.clone());

        let found = barcodes(&svc, &[("onShelf", "true")]).await.unwrap();
        assert_eq!(found, vec![austin]);
        assert_eq!(MemoryStore::calls(&store.name_lookups), 0);
        assert_eq!(MemoryStore::calls(&store.product_lookups), 0);
        assert_eq!(MemoryStore::calls(&store.item_lookups), 1);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let (store, _, _) = warehouse_scenario();
        let svc = service(store);
        let first = barcodes(&svc, &[("product", "widget")]).await.unwrap();
        let second = barcodes(&svc, &[("product", "widget")]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![100, 200]);
    }

    #[tokio::test]
    async fn single_match_is_still_a_sequence() {
        let (store, _, _) = warehouse_scenario();
        let svc = service(store);
        let items = svc.advanced_search(&query(&[("barcode", "200")])).await.unwrap();
        let json = serde_json::to_value(&items).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["manufacturer"], "Acme");
        assert_eq!(json[0]["category"], "Electronics");
    }

    #[tokio::test]
    async fn typed_plan_runs_directly() {
        let (store, denver, _) = warehouse_scenario();
        let svc = service(store);
        let plan = QueryPlan::from_fields([
            SearchField::Manufacturer("acm".into()),
            SearchField::OnShelf(false),
        ]);
        let items = svc.execute(&plan).await.unwrap();
        assert_eq!(items.iter().map(|i| i.barcode).collect::<Vec<_>>(), vec![denver]);
    }

    #[tokio::test]
    async fn on_shelf_listing_splits_items() {
        let (store, denver, austin) = warehouse_scenario();
        let svc = service(store);
        let out: Vec<i64> = svc.items_on_shelf(false).await.unwrap().iter().map(|i| i.barcode).collect();
        let shelf: Vec<i64> = svc.items_on_shelf(true).await.unwrap().iter().map(|i| i.barcode).collect();
        assert_eq!(out, vec![denver]);
        assert_eq!(shelf, vec![austin]);
    }

    struct StalledStore;

    #[async_trait]
    impl SearchStore for StalledStore {
        async fn category_ids_by_name(&self, _: &str) -> Result<Vec<Uuid>, AppError> {
            Ok(Vec::new())
        }
        async fn manufacturer_ids_by_name(&self, _: &str) -> Result<Vec<Uuid>, AppError> {
            Ok(Vec::new())
        }
        async fn product_ids(&self, _: &ProductFilter) -> Result<Vec<Uuid>, AppError> {
            Ok(Vec::new())
        }
        async fn items(&self, _: &ItemFilter) -> Result<Vec<ItemDetail>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn slow_store_hits_the_deadline() {
        let svc = SearchService::new(Arc::new(StalledStore), Duration::from_millis(20));
        let err = svc.advanced_search(&query(&[("warehouse", "Denver")])).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}
