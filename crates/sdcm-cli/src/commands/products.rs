//! Product commands

use anyhow::{Context, Result};
use sdcm_client::SdcmClient;
use std::path::Path;

use crate::output::OutputContext;

/// List products, or one continuation page of them
pub async fn products(
    client: &SdcmClient,
    continuation: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let page = match continuation {
        Some(link) => client.get_products_page(link).await,
        None => client.get_products().await,
    }
    .context("Failed to list products")?;

    ctx.print_json(&page);
    Ok(())
}

/// Show a single product
pub async fn product(client: &SdcmClient, product_id: &str, ctx: &OutputContext) -> Result<()> {
    let product = client
        .get_product(product_id)
        .await
        .with_context(|| format!("Failed to get product {}", product_id))?;

    ctx.print_json(&product);
    Ok(())
}

/// Create a product from a JSON body file
pub async fn create_product(client: &SdcmClient, body: &Path, ctx: &OutputContext) -> Result<()> {
    let body = super::read_json_body(body)?;
    let product = client
        .create_product(&body)
        .await
        .context("Failed to create product")?;

    if let Some(id) = product.get("id") {
        ctx.success(&format!("Created product {}", id));
    }
    ctx.print_json(&product);
    Ok(())
}
