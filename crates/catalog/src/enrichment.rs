//! Joins category and image data onto product listings.
//!
//! These are the pure halves of
//! [`crate::CatalogClient::get_enhanced_products`]; the client does the
//! fetching, this module does the joining.

use std::collections::HashMap;

use crate::category_tree::{index_by_code, split_path};
use crate::identifiers::ProductCode;
use crate::models::{Category, Product, ProductImage};

/// Only this many leading products of a page get images.
pub const IMAGE_PRODUCT_LIMIT: usize = 20;

/// Concurrent image fetches for one enhanced listing.
pub const IMAGE_FETCH_CONCURRENCY: usize = 3;

/// Sets `category_name` and `category_path` from a labeled forest, matching on
/// `default_category_code`. Products whose category is unknown are untouched.
pub fn apply_categories(products: &mut [Product], forest: &[Category]) {
    let index = index_by_code(forest);
    for product in products {
        let Some(category) = product
            .default_category_code
            .as_ref()
            .and_then(|code| index.get(code.as_str()))
        else {
            continue;
        };
        product.category_name = category.category_name.clone();
        product.category_path = category.path.as_deref().map(split_path);
    }
}

/// Codes of the leading [`IMAGE_PRODUCT_LIMIT`] products, blanks skipped.
pub fn image_keys(products: &[Product]) -> Vec<ProductCode> {
    products
        .iter()
        .take(IMAGE_PRODUCT_LIMIT)
        .filter_map(|p| p.code().and_then(ProductCode::new))
        .collect()
}

/// The flagged primary image, else the first image.
pub fn primary_image(images: &[ProductImage]) -> Option<&ProductImage> {
    images
        .iter()
        .find(|image| image.is_primary_image())
        .or_else(|| images.first())
}

/// Attaches fetched images to the leading [`IMAGE_PRODUCT_LIMIT`] products and
/// sets `image_url` / `thumbnail_url` from the primary image.
pub fn apply_images(products: &mut [Product], images: &HashMap<ProductCode, Vec<ProductImage>>) {
    for product in products.iter_mut().take(IMAGE_PRODUCT_LIMIT) {
        let Some(found) = product
            .code()
            .and_then(ProductCode::new)
            .and_then(|code| images.get(&code))
        else {
            continue;
        };
        if found.is_empty() {
            continue;
        }
        if let Some(primary) = primary_image(found) {
            product.thumbnail_url = primary.thumbnail().cloned();
            product.image_url = primary.url().cloned();
        }
        product.images = Some(found.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_tree::{build_forest, label_paths};
    use crate::types::Text;

    fn product(code: &str, category: Option<&str>) -> Product {
        Product {
            product_code: Some(Text::from(code)),
            default_category_code: category.map(Text::from),
            ..Product::default()
        }
    }

    fn image(url: &str, primary: bool) -> ProductImage {
        ProductImage {
            image_url: Some(Text::from(url)),
            thumbnail_url: Some(Text::from(format!("{url}?thumb"))),
            is_primary: Some(Text::from(if primary { "1" } else { "0" })),
            ..ProductImage::default()
        }
    }

    #[test]
    fn test_category_name_and_path_joined_by_default_code() {
        let mut forest = build_forest(vec![
            Category {
                category_code: Some(Text::from("T1")),
                category_name: Some(Text::from("Electronics")),
                ..Category::default()
            },
            Category {
                category_code: Some(Text::from("T2")),
                category_name: Some(Text::from("Phones")),
                parent_category_code: Some(Text::from("T1")),
                ..Category::default()
            },
        ]);
        label_paths(&mut forest);

        let mut products = vec![product("P1", Some("T2")), product("P2", Some("T404"))];
        apply_categories(&mut products, &forest);

        assert_eq!(products[0].category_name.as_ref().unwrap().as_str(), "Phones");
        assert_eq!(
            products[0].category_path.as_deref(),
            Some(&["Electronics".to_string(), "Phones".to_string()][..])
        );
        assert!(products[1].category_name.is_none());
    }

    #[test]
    fn test_image_keys_capped_and_blank_codes_skipped() {
        let mut products: Vec<Product> = (0..25).map(|i| product(&format!("P{i}"), None)).collect();
        products[3].product_code = Some(Text::from(" "));
        let keys = image_keys(&products);
        assert_eq!(keys.len(), IMAGE_PRODUCT_LIMIT - 1);
        assert_eq!(keys.last().unwrap().as_str(), "P19");
    }

    #[test]
    fn test_primary_image_prefers_flag_then_first() {
        let flagged = vec![image("a", false), image("b", true)];
        assert_eq!(primary_image(&flagged).unwrap().url().unwrap().as_str(), "b");
        let unflagged = vec![image("a", false), image("b", false)];
        assert_eq!(primary_image(&unflagged).unwrap().url().unwrap().as_str(), "a");
        assert!(primary_image(&[]).is_none());
    }

    #[test]
    fn test_apply_images_sets_urls_from_primary() {
        let mut products = vec![product("P1", None), product("P2", None)];
        let mut images = HashMap::new();
        images.insert(
            ProductCode::new("P1").unwrap(),
            vec![image("x", false), image("y", true)],
        );

        apply_images(&mut products, &images);

        assert_eq!(products[0].image_url.as_ref().unwrap().as_str(), "y");
        assert_eq!(products[0].thumbnail_url.as_ref().unwrap().as_str(), "y?thumb");
        assert_eq!(products[0].images.as_ref().unwrap().len(), 2);
        assert!(products[1].images.is_none());
    }
}
