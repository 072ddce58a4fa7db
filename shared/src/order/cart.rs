//! Cart Engine
//!
//! 以菜品 ID 为键的行项目集合。每个菜品在购物车中至多一行，
//! 数量始终在 1..=[`MAX_LINE_QUANTITY`] 内（降到 0 即移除该行）。行的顺序为加入顺序。
//! 金额运算饱和到 `Decimal::MAX`，`total()` 对任何购物车都有定义。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Dish;

/// Upper bound for one line's quantity; larger increments are clamped
pub const MAX_LINE_QUANTITY: i32 = 9_999;

/// Cart line item: dish snapshot + quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub dish_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    fn from_dish(dish: &Dish) -> Self {
        Self {
            dish_id: dish.id.clone(),
            name: dish.name.clone(),
            price: dish.price,
            quantity: 1,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// In-memory cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `dish`
    ///
    /// 已存在则数量 +1，否则新建数量为 1 的行（价格快照取自 `dish`）。
    pub fn add(&mut self, dish: &Dish) {
        match self.line_mut(&dish.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY),
            None => self.lines.push(CartLine::from_dish(dish)),
        }
    }

    /// Apply a quantity delta; a result ≤ 0 removes the line
    pub fn update_quantity(&mut self, dish_id: &str, delta: i32) {
        let Some(pos) = self.position(dish_id) else {
            return;
        };
        let next = self.lines[pos].quantity.saturating_add(delta);
        if next <= 0 {
            self.lines.remove(pos);
        } else {
            self.lines[pos].quantity = next.min(MAX_LINE_QUANTITY);
        }
    }

    /// Remove the line regardless of quantity
    pub fn remove(&mut self, dish_id: &str) {
        self.lines.retain(|line| line.dish_id != dish_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Subtract the quantities of `submitted` from this cart
    ///
    /// 结账成功后只移除已下单的部分，结账期间新加的菜品保留。
    pub fn deduct(&mut self, submitted: &Cart) {
        for line in submitted.lines() {
            self.update_quantity(&line.dish_id, -line.quantity);
        }
    }

    /// Σ(price × quantity)
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.subtotal()))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, dish_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.dish_id == dish_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    fn position(&self, dish_id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.dish_id == dish_id)
    }

    fn line_mut(&mut self, dish_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.dish_id == dish_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dish(id: &str, price: Decimal) -> Dish {
        Dish {
            id: id.to_string(),
            name: format!("Dish {id}"),
            description: None,
            price,
            category_id: None,
            available: true,
            is_offer: false,
            created_at: Utc::now(),
            category: None,
        }
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_add_twice_then_decrement_twice() {
        // 同一菜品加两次 → 一行数量 2；再减两次 → 购物车为空
        let d1 = dish("d1", Decimal::new(1000, 2));
        let mut cart = Cart::new();

        cart.add(&d1);
        cart.add(&d1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.get("d1").unwrap().quantity, 2);

        cart.update_quantity("d1", -1);
        assert_eq!(cart.get("d1").unwrap().quantity, 1);
        cart.update_quantity("d1", -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_is_exact_decimal() {
        let mut cart = Cart::new();
        let tacos = dish("d1", Decimal::new(999, 2));
        let soda = dish("d2", Decimal::new(500, 2));
        cart.add(&tacos);
        cart.add(&tacos);
        cart.add(&soda);

        assert_eq!(cart.total(), Decimal::new(2498, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_lines_unique_per_dish() {
        let mut cart = Cart::new();
        let a = dish("a", Decimal::ONE);
        let b = dish("b", Decimal::TWO);
        for d in [&a, &b, &a, &b, &a] {
            cart.add(d);
        }

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.dish_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        assert_eq!(cart.get("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_large_negative_delta_removes_line() {
        let mut cart = Cart::new();
        cart.add(&dish("d1", Decimal::ONE));
        cart.update_quantity("d1", -50);
        assert!(cart.get("d1").is_none());
    }

    #[test]
    fn test_update_unknown_dish_is_noop() {
        let mut cart = Cart::new();
        cart.add(&dish("d1", Decimal::ONE));
        let before = cart.clone();

        cart.update_quantity("missing", 3);
        cart.remove("missing");
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_ignores_quantity() {
        let mut cart = Cart::new();
        let d1 = dish("d1", Decimal::ONE);
        cart.add(&d1);
        cart.update_quantity("d1", 4);
        assert_eq!(cart.get("d1").unwrap().quantity, 5);

        cart.remove("d1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_snapshot_taken_on_first_add() {
        let mut cart = Cart::new();
        let mut d1 = dish("d1", Decimal::new(300, 2));
        cart.add(&d1);

        d1.price = Decimal::new(900, 2);
        cart.add(&d1);

        let line = cart.get("d1").unwrap();
        assert_eq!(line.price, Decimal::new(300, 2));
        assert_eq!(cart.total(), Decimal::new(600, 2));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&dish("d1", Decimal::ONE));
        cart.add(&dish("d2", Decimal::ONE));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_price_total_saturates() {
        let mut cart = Cart::new();
        let d1 = dish("d1", Decimal::from_i128_with_scale(10_i128.pow(27), 0));
        cart.add(&d1);
        cart.update_quantity("d1", 100);

        assert_eq!(cart.get("d1").unwrap().quantity, 101);
        assert_eq!(cart.get("d1").unwrap().subtotal(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);

        cart.add(&dish("d2", Decimal::MAX));
        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_quantity_is_clamped() {
        let mut cart = Cart::new();
        let d1 = dish("d1", Decimal::ONE);
        cart.add(&d1);
        cart.update_quantity("d1", i32::MAX);
        assert_eq!(cart.get("d1").unwrap().quantity, MAX_LINE_QUANTITY);

        cart.add(&d1);
        assert_eq!(cart.get("d1").unwrap().quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_deduct_keeps_lines_added_later() {
        let tacos = dish("tacos", Decimal::new(999, 2));
        let agua = dish("agua", Decimal::new(500, 2));

        let mut cart = Cart::new();
        cart.add(&tacos);
        cart.add(&tacos);
        let submitted = cart.clone();

        // 提交期间又加了菜
        cart.add(&tacos);
        cart.add(&agua);
        cart.deduct(&submitted);

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.dish_id.as_str()).collect();
        assert_eq!(ids, vec!["tacos", "agua"]);
        assert_eq!(cart.get("tacos").unwrap().quantity, 1);
        assert_eq!(cart.get("agua").unwrap().quantity, 1);

        let mut same = submitted.clone();
        same.deduct(&submitted);
        assert!(same.is_empty());
    }
}
