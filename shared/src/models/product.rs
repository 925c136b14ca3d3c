//! Product Model

use serde::{Deserialize, Serialize};

use super::station::Station;

/// Product entity
///
/// `menu_category` groups products on the cash-register menu; `station` names the
/// dashboard that prepares the product. The two are independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Stock on hand
    pub stock: i64,
    /// Cumulative sold count
    pub sold: i64,
    pub menu_category: String,
    pub station: Station,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub stock: Option<i64>,
    pub menu_category: String,
    pub station: Station,
}

/// Menu category with its products, in catalog order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSection {
    pub category: String,
    pub products: Vec<Product>,
}

impl MenuSection {
    /// Group products (sorted by id) into sections ordered by first appearance
    pub fn group(products: Vec<Product>) -> Vec<MenuSection> {
        let mut sections: Vec<MenuSection> = Vec::new();
        for product in products {
            match sections
                .iter_mut()
                .find(|s| s.category == product.menu_category)
            {
                Some(section) => section.products.push(product),
                None => sections.push(MenuSection {
                    category: product.menu_category.clone(),
                    products: vec![product],
                }),
            }
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, category: &str) -> Product {
        Product {
            id,
            name: format!("p{id}"),
            price: 1.0,
            stock: 10,
            sold: 0,
            menu_category: category.to_string(),
            station: Station::new("Bar").unwrap(),
        }
    }

    #[test]
    fn test_menu_group_keeps_first_appearance_order() {
        let sections = MenuSection::group(vec![
            product(1, "Bevande"),
            product(2, "Primi"),
            product(3, "Bevande"),
        ]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, "Bevande");
        assert_eq!(sections[0].products.len(), 2);
        assert_eq!(sections[1].category, "Primi");
    }
}
