//! Plain-text tables for the terminal.

use chrono::{DateTime, Utc};
use shared::{
    domain::{Category, Order, Product, Resource, StatusValue},
    protocol::Pagination,
};

pub trait Row: Resource {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl Row for Order {
    fn headers() -> &'static [&'static str] {
        &["ORDER", "CUSTOMER", "DATE", "TOTAL", "STATUS", "PAYMENT", "ITEMS"]
    }

    fn cells(&self) -> Vec<String> {
        let customer = self
            .customer_info
            .as_ref()
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| "N/A".to_string());
        vec![
            format!("#{}", self.id.short()),
            customer,
            format_date(self.created_at),
            format_currency(self.total),
            capitalize(self.status.as_str()),
            self.payment_status.clone().unwrap_or_else(|| "N/A".to_string()),
            format!("{} item(s)", self.items.len()),
        ]
    }
}

impl Row for Product {
    fn headers() -> &'static [&'static str] {
        &["PRODUCT", "TITLE", "SKU", "CATEGORY", "PRICE", "STOCK", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("#{}", self.id.short()),
            self.product_title.clone(),
            self.sku.clone(),
            self.product_category.clone(),
            format_currency(self.product_amount),
            self.stock_quantity
                .map(|q| format!("{q:.0}"))
                .unwrap_or_else(|| "N/A".to_string()),
            capitalize(self.status.as_str()),
        ]
    }
}

pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(amount) if amount.is_finite() => format!("${amount:.2}"),
        _ => "N/A".to_string(),
    }
}

pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_page<T: Row>(items: &[&T], pagination: Pagination) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str(&format!("No {}s found.\n", T::LABEL));
    } else {
        let rows: Vec<Vec<String>> = items.iter().map(|item| item.cells()).collect();
        out.push_str(&render_table(T::headers(), &rows));
    }
    out.push_str(&format!(
        "Page {} of {} ({} total {}s)\n",
        pagination.page,
        pagination.total_pages,
        pagination.total,
        T::LABEL
    ));

    let mut hints = Vec::new();
    if pagination.has_previous() {
        hints.push(format!("--page {} for previous", pagination.page - 1));
    }
    if pagination.has_next() {
        hints.push(format!("--page {} for next", pagination.page + 1));
    }
    if !hints.is_empty() {
        out.push_str(&format!("Use {}.\n", hints.join(", ")));
    }
    out
}

pub fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }
    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|category| {
            vec![
                category.name.clone(),
                category.slug.clone().unwrap_or_default(),
                category.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&["NAME", "SLUG", "DESCRIPTION"], &rows)
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_and_date_fall_back_to_na() {
        assert_eq!(format_currency(Some(42.5)), "$42.50");
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_date(None), "N/A");

        let date = DateTime::parse_from_rfc3339("2024-04-06T10:15:00Z")
            .expect("date")
            .with_timezone(&Utc);
        assert_eq!(format_date(Some(date)), "Apr 06, 2024 10:15");
    }

    #[test]
    fn order_row_shows_short_id_and_capitalized_status() {
        let order: Order = serde_json::from_value(json!({
            "_id": "6610aa00bb11cc22dd33ee44",
            "status": "processing",
            "customerInfo": { "name": "Rahim" },
            "total": 9,
            "items": [{ "title": "Mug" }, { "title": "Tee" }],
        }))
        .expect("order");

        let cells = order.cells();
        assert_eq!(cells[0], "#33ee44");
        assert_eq!(cells[1], "Rahim");
        assert_eq!(cells[3], "$9.00");
        assert_eq!(cells[4], "Processing");
        assert_eq!(cells[5], "N/A");
        assert_eq!(cells[6], "2 item(s)");
    }

    #[test]
    fn empty_page_renders_placeholder_and_footer() {
        let out = render_page::<Product>(&[], Pagination::default());
        assert_eq!(out, "No products found.\nPage 1 of 1 (0 total products)\n");
    }

    #[test]
    fn middle_page_footer_points_both_ways() {
        let pagination = Pagination {
            page: 2,
            total_pages: 3,
            total: 25,
        };
        let out = render_page::<Order>(&[], pagination);
        assert_eq!(
            out,
            "No orders found.\nPage 2 of 3 (25 total orders)\nUse --page 1 for previous, --page 3 for next.\n"
        );

        let last = Pagination { page: 3, ..pagination };
        assert!(render_page::<Order>(&[], last).ends_with("Use --page 2 for previous.\n"));
    }

    #[test]
    fn categories_render_with_blank_optional_columns() {
        let categories: Vec<Category> = serde_json::from_value(json!([
            { "_id": "c1", "name": "Kitchen", "slug": "kitchen", "description": "Pots" },
            { "_id": "c2", "name": "Garden" },
        ]))
        .expect("categories");
        assert_eq!(
            render_categories(&categories),
            "NAME     SLUG     DESCRIPTION\nKitchen  kitchen  Pots\nGarden\n"
        );
        assert_eq!(render_categories(&[]), "No categories found.\n");
    }

    #[test]
    fn columns_are_aligned_to_widest_cell() {
        let out = render_table(
            &["ID", "NAME"],
            &[
                vec!["1".into(), "Kettle".into()],
                vec!["22".into(), "Tea".into()],
            ],
        );
        assert_eq!(out, "ID  NAME\n1   Kettle\n22  Tea\n");
    }
}
