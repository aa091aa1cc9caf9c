//! A small product catalogue mounted by the binary.
//!
//! Every route answers in any representation:
//! - `GET /products` a page view, swapped for a serialized writer on demand
//! - `GET /products/{id}` a serializable result, 404 fault when missing
//! - `GET /status` a view already bound to JSON, with envelope headers
//! - `POST /echo` echoes a JSON body back as a serializable result
//! - `GET /fail` an internal fault with a source chain

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ServiceConfig;
use crate::negotiation::Format;
use crate::serialization::{Model, SerializationConfig};
use crate::service::{ActionFault, ActionRequest, ActionResult, ErrorResult, ServiceRouter, View};

/// Member never written by the serializers.
const IGNORED_MEMBER: &str = "internal_notes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    pub in_stock: bool,
    /// Non-public: only written when the config asks for it.
    pub _supplier_cost: f64,
    pub internal_notes: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn sample() -> Self {
        let product = |id, name: &str, price, in_stock, cost| Product {
            id,
            name: name.to_string(),
            price,
            in_stock,
            _supplier_cost: cost,
            internal_notes: format!("restock review for #{id}"),
        };
        Self::new(vec![
            product(1, "Anvil", 149.5, true, 61.0),
            product(2, "Rocket Skates", 89.99, false, 40.25),
            product(3, "Giant Magnet", 35.0, true, 12.75),
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// The demo actions, translating faults into [`ErrorResult`] payloads.
pub fn service(config: &ServiceConfig) -> ServiceRouter {
    let catalog = Arc::new(Catalog::sample());
    let list = catalog.clone();
    let single = catalog.clone();

    ServiceRouter::new(config)
        .with_error_result(ErrorResult::factory())
        .get("/products", "products", move |req| list_products(list.clone(), req))
        .get("/products/{id}", "product", move |req| get_product(single.clone(), req))
        .get("/status", "status", move |req| status(catalog.clone(), req))
        .post("/echo", "echo", echo)
        .get("/fail", "fail", fail)
}

async fn list_products(catalog: Arc<Catalog>, _req: ActionRequest) -> Result<ActionResult, ActionFault> {
    let model = Model::new(catalog.products())?.ignoring([IGNORED_MEMBER]);
    Ok(ActionResult::view(model, View::page(render_list(catalog.products()))))
}

async fn get_product(catalog: Arc<Catalog>, req: ActionRequest) -> Result<ActionResult, ActionFault> {
    let raw = req.param("id").unwrap_or_default();
    let id: u32 = raw
        .parse()
        .map_err(|_| ActionFault::http(StatusCode::BAD_REQUEST, format!("'{raw}' is not a product id")))?;

    let product = catalog
        .find(id)
        .ok_or_else(|| ActionFault::not_found(format!("No product with id {id}")))?;

    Ok(ActionResult::serializable(Model::new(product)?.ignoring([IGNORED_MEMBER])))
}

async fn status(catalog: Arc<Catalog>, _req: ActionRequest) -> Result<ActionResult, ActionFault> {
    let config = SerializationConfig::new()
        .header("service", "catalog")
        .header("version", env!("CARGO_PKG_VERSION"));
    let model = Model::from_value(json!({
        "healthy": true,
        "products": catalog.products().len(),
    }));
    Ok(ActionResult::view(model, View::serialized(Format::Json, config)))
}

async fn echo(req: ActionRequest) -> Result<ActionResult, ActionFault> {
    let value: Value = serde_json::from_slice(&req.body)
        .map_err(|e| ActionFault::http(StatusCode::BAD_REQUEST, format!("Body is not JSON: {e}")))?;
    Ok(ActionResult::serializable(Model::from_value(value)))
}

async fn fail(_req: ActionRequest) -> Result<ActionResult, ActionFault> {
    let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "inventory backend timed out");
    Err(ActionFault::with_source("Inventory unavailable", cause))
}

fn render_list(products: &[Product]) -> String {
    let items: String = products
        .iter()
        .map(|p| format!("<li>{} ({:.2})</li>", escape_html(&p.name), p.price))
        .collect();
    format!("<!DOCTYPE html><html><body><h1>Products</h1><ul>{items}</ul></body></html>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
