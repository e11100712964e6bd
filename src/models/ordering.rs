use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::limits::MAX_REORDER_ITEMS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("Invalid payload")]
    InvalidPayload,

    #[error("Invalid direction \"{0}\". Use \"up\" or \"down\"")]
    InvalidDirection(String),

    #[error("Item {0} is not part of this menu")]
    UnknownItem(i32),
}

/// One `(item id, new order)` pair of a batch reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: i32,
    pub order: i32,
}

/// Minimal view of an item for sorting and move planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positioned {
    pub id: i32,
    pub order: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = OrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(OrderingError::InvalidDirection(s.to_string())),
        }
    }
}

/// Display order: `order` ascending, then creation time, then id.
#[must_use]
pub fn display_cmp(a: &Positioned, b: &Positioned) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Parses `{ "items": [{ "id": <int>, "order": <int> }, ...] }`.
///
/// Entries may use `_id` in place of `id`. Any structural problem rejects
/// the whole payload.
pub fn parse_reorder_payload(body: &Value) -> Result<Vec<OrderEntry>, OrderingError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or(OrderingError::InvalidPayload)?;

    if items.len() > MAX_REORDER_ITEMS {
        return Err(OrderingError::InvalidPayload);
    }

    items
        .iter()
        .map(|entry| {
            let id = entry
                .get("id")
                .or_else(|| entry.get("_id"))
                .and_then(as_i32)
                .ok_or(OrderingError::InvalidPayload)?;
            let order = entry
                .get("order")
                .and_then(as_i32)
                .ok_or(OrderingError::InvalidPayload)?;
            Ok(OrderEntry { id, order })
        })
        .collect()
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

/// Plans the updates needed to swap `id` with its neighbour.
///
/// `sorted` must already be in display order. Returns an empty plan when the
/// item sits at the edge in the requested direction. When the item and its
/// neighbour share an order value, the whole list is first renumbered by
/// position so the swap changes what clients see.
pub fn plan_move(
    sorted: &[Positioned],
    id: i32,
    direction: Direction,
) -> Result<Vec<OrderEntry>, OrderingError> {
    let index = sorted
        .iter()
        .position(|p| p.id == id)
        .ok_or(OrderingError::UnknownItem(id))?;

    let neighbour = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&n| n < sorted.len()),
    };

    let Some(neighbour) = neighbour else {
        return Ok(Vec::new());
    };

    let current = &sorted[index];
    let other = &sorted[neighbour];

    if current.order != other.order {
        return Ok(vec![
            OrderEntry {
                id: current.id,
                order: other.order,
            },
            OrderEntry {
                id: other.id,
                order: current.order,
            },
        ]);
    }

    let mut renumbered: Vec<i32> = sorted.iter().map(|p| p.id).collect();
    renumbered.swap(index, neighbour);

    Ok(renumbered
        .into_iter()
        .zip(0_i32..)
        .filter(|(item_id, position)| {
            sorted
                .iter()
                .find(|p| p.id == *item_id)
                .is_some_and(|p| p.order != *position)
        })
        .map(|(item_id, position)| OrderEntry {
            id: item_id,
            order: position,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: i32, order: i32) -> Positioned {
        Positioned {
            id,
            order,
            created_at: format!("2025-01-01T00:00:{id:02}Z"),
        }
    }

    fn apply(items: &[Positioned], plan: &[OrderEntry]) -> Vec<i32> {
        let mut next: Vec<Positioned> = items
            .iter()
            .map(|p| {
                let order = plan
                    .iter()
                    .find(|e| e.id == p.id)
                    .map_or(p.order, |e| e.order);
                Positioned {
                    order,
                    ..p.clone()
                }
            })
            .collect();
        next.sort_by(display_cmp);
        next.into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_parse_valid_payload() {
        let body = json!({"items": [{"id": 3, "order": 0}, {"_id": 1, "order": 1}]});
        let entries = parse_reorder_payload(&body).unwrap();
        assert_eq!(
            entries,
            vec![OrderEntry { id: 3, order: 0 }, OrderEntry { id: 1, order: 1 }]
        );
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        for body in [
            json!({}),
            json!({"items": "nope"}),
            json!({"items": {"id": 1}}),
            json!({"items": [{"id": 1}]}),
            json!({"items": [{"id": "x", "order": 1}]}),
            json!({"items": [{"id": 1, "order": 1.5}]}),
            json!([{"id": 1, "order": 1}]),
        ] {
            assert_eq!(
                parse_reorder_payload(&body),
                Err(OrderingError::InvalidPayload),
                "{body}"
            );
        }
    }

    #[test]
    fn test_move_swaps_distinct_orders() {
        let items = vec![item(1, 0), item(2, 5), item(3, 9)];
        let plan = plan_move(&items, 3, Direction::Up).unwrap();

        assert_eq!(
            plan,
            vec![OrderEntry { id: 3, order: 5 }, OrderEntry { id: 2, order: 9 }]
        );
        assert_eq!(apply(&items, &plan), vec![1, 3, 2]);
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let items = vec![item(1, 0), item(2, 1)];
        assert!(plan_move(&items, 1, Direction::Up).unwrap().is_empty());
        assert!(plan_move(&items, 2, Direction::Down).unwrap().is_empty());
    }

    #[test]
    fn test_move_with_tied_orders_renumbers() {
        let items = vec![item(1, 0), item(2, 0), item(3, 0)];
        let plan = plan_move(&items, 1, Direction::Down).unwrap();

        assert_eq!(apply(&items, &plan), vec![2, 1, 3]);
    }

    #[test]
    fn test_move_unknown_item() {
        let items = vec![item(1, 0)];
        assert_eq!(
            plan_move(&items, 42, Direction::Up),
            Err(OrderingError::UnknownItem(42))
        );
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert!("left".parse::<Direction>().is_err());
    }
}
