//! Subscription fan-out: bundle purchases and activity cascades.
//!
//! Buying a subscription materializes one class per lesson unit of the
//! purchased product. Toggling subscription activity is a bulk field sync
//! over the owned classes, not a cascade of individual transitions: it
//! never touches anyone's scheduling state.

use crate::store::BookingStore;
use crate::types::{Class, Subscription};
use crate::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

impl BookingStore {
    /// Buy a product bundle, fanning out one class per lesson unit
    pub fn buy_subscription(
        &mut self,
        customer_id: Uuid,
        product_id: &str,
        buy_price_minor: i64,
    ) -> Result<Uuid> {
        let product = self
            .catalog
            .products
            .get(product_id)
            .ok_or_else(|| Error::NotFound("product", product_id.to_string()))?
            .clone();

        let subscription = Subscription {
            id: Uuid::new_v4(),
            customer_id,
            product_id: product.id.clone(),
            buy_price_minor,
            active: true,
            bought_at: Utc::now(),
        };
        let subscription_id = subscription.id;
        let active = subscription.active;

        // Resolve every unit up front so a dangling lesson reference can
        // never leave a partially fanned-out purchase behind
        let mut units = Vec::new();
        for unit in product.lesson_units() {
            units.push((self.lesson(&unit.lesson_id)?.clone(), unit.quantity));
        }

        let mut fanned_out = 0;
        for (lesson, quantity) in units {
            for _ in 0..quantity {
                let class = Class {
                    id: Uuid::new_v4(),
                    customer_id,
                    lesson_id: lesson.id.clone(),
                    kind: lesson.kind,
                    subscription_id: Some(subscription_id),
                    active,
                    timeline_entry_id: None,
                    bought_at: subscription.bought_at,
                };
                self.classes.insert(class.id, class);
                fanned_out += 1;
            }
        }

        self.subscriptions.insert(subscription_id, subscription);
        tracing::info!(
            "Customer {} bought subscription {} ({}): {} classes",
            customer_id,
            subscription_id,
            product_id,
            fanned_out
        );
        Ok(subscription_id)
    }

    /// Set subscription activity, syncing the flag onto every owned class
    ///
    /// One pass over the class table; a concurrent reader of the store can
    /// never observe a partially-propagated flag. Idempotent.
    pub fn set_subscription_active(&mut self, subscription_id: Uuid, active: bool) -> Result<()> {
        let subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or_else(|| Error::NotFound("subscription", subscription_id.to_string()))?;
        subscription.active = active;

        let mut synced = 0;
        for class in self.classes.values_mut() {
            if class.subscription_id == Some(subscription_id) {
                class.active = active;
                synced += 1;
            }
        }

        tracing::info!(
            "Subscription {} set active={}, synced {} classes",
            subscription_id,
            active,
            synced
        );
        Ok(())
    }

    /// Classes owned by a subscription
    pub fn classes_for_subscription(&self, subscription_id: Uuid) -> Vec<&Class> {
        self.classes
            .values()
            .filter(|c| c.subscription_id == Some(subscription_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teachers::{Teacher, WorkingHours};
    use crate::timeline::EntryOptions;
    use crate::types::LessonKind;
    use chrono::{NaiveTime, TimeZone, Utc};
    use std::collections::HashSet;

    #[test]
    fn test_fan_out_matches_product_units() {
        let mut store = BookingStore::new();
        let customer_id = Uuid::new_v4();

        let sub_id = store
            .buy_subscription(customer_id, "six_lessons", 15_000)
            .unwrap();

        let product = store.catalog.products.get("six_lessons").unwrap();
        let expected = product.total_quantity() as usize;
        assert_eq!(store.classes_for_subscription(sub_id).len(), expected);

        let ordinary = store
            .classes_for_subscription(sub_id)
            .iter()
            .filter(|c| c.kind == LessonKind::Ordinary)
            .count();
        let with_native = store
            .classes_for_subscription(sub_id)
            .iter()
            .filter(|c| c.kind == LessonKind::WithNative)
            .count();
        assert_eq!(ordinary, 4);
        assert_eq!(with_native, 2);
    }

    #[test]
    fn test_second_purchase_fans_out_again() {
        let mut store = BookingStore::new();
        let customer_id = Uuid::new_v4();

        store
            .buy_subscription(customer_id, "six_lessons", 15_000)
            .unwrap();
        let second = store
            .buy_subscription(customer_id, "six_lessons", 15_000)
            .unwrap();

        assert_eq!(store.classes.len(), 12);
        assert_eq!(store.classes_for_subscription(second).len(), 6);
    }

    #[test]
    fn test_unknown_product_fails() {
        let mut store = BookingStore::new();
        let result = store.buy_subscription(Uuid::new_v4(), "no_such_pack", 0);
        assert!(matches!(result, Err(Error::NotFound("product", _))));
    }

    #[test]
    fn test_disabling_subscription_cascades_to_classes() {
        let mut store = BookingStore::new();
        let sub_id = store
            .buy_subscription(Uuid::new_v4(), "six_lessons", 15_000)
            .unwrap();

        for class in store.classes_for_subscription(sub_id) {
            assert!(class.active);
        }

        store.set_subscription_active(sub_id, false).unwrap();
        for class in store.classes_for_subscription(sub_id) {
            assert!(!class.active);
        }
    }

    #[test]
    fn test_toggle_is_idempotent_and_restores_flags() {
        let mut store = BookingStore::new();
        let teacher = Teacher {
            id: Uuid::new_v4(),
            name: "Fedor".into(),
            working_hours: vec![WorkingHours {
                weekday: 0,
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }],
            acceptable_kinds: HashSet::new(),
        };
        let teacher_id = teacher.id;
        store.upsert_teacher(teacher);

        let sub_id = store
            .buy_subscription(Uuid::new_v4(), "six_lessons", 15_000)
            .unwrap();

        // Schedule one of the bundled classes in between the toggles
        let class_id = store
            .classes_for_subscription(sub_id)
            .iter()
            .find(|c| c.kind == LessonKind::Ordinary)
            .map(|c| c.id)
            .unwrap();
        let entry_id = store
            .create_entry(
                teacher_id,
                "ordinary_default",
                Utc.with_ymd_and_hms(2032, 5, 3, 13, 0, 0).unwrap(),
                None,
                EntryOptions::default(),
            )
            .unwrap();
        store.schedule(class_id, entry_id).unwrap();

        store.set_subscription_active(sub_id, false).unwrap();
        store.set_subscription_active(sub_id, false).unwrap();

        // Deactivation never unschedules
        assert!(store.class(class_id).unwrap().is_scheduled());
        assert!(!store.class(class_id).unwrap().active);

        store.set_subscription_active(sub_id, true).unwrap();
        for class in store.classes_for_subscription(sub_id) {
            assert!(class.active);
        }
        assert!(store.class(class_id).unwrap().is_scheduled());
    }

    #[test]
    fn test_sync_skips_other_subscriptions() {
        let mut store = BookingStore::new();
        let first = store
            .buy_subscription(Uuid::new_v4(), "six_lessons", 15_000)
            .unwrap();
        let second = store
            .buy_subscription(Uuid::new_v4(), "six_lessons", 15_000)
            .unwrap();

        store.set_subscription_active(first, false).unwrap();

        for class in store.classes_for_subscription(second) {
            assert!(class.active);
        }
    }
}
