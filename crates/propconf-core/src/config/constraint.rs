//! Value constraints.
//!
//! A [`Constraint<T>`] validates a candidate value before it is written to a
//! config.  Constraints attached directly to a typed member are checked by
//! the compiler.  A [`ConstraintRef`] is the type-erased form used when a
//! constraint is chosen independently of the member it ends up on (for
//! example from a shared table); its target type is checked once, when the
//! member is discovered.

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;

/// Validates candidate values of type `T`.
pub trait Constraint<T>: Send + Sync {
    /// Returns a human-readable reason if `value` is not allowed.
    fn check(&self, value: &T) -> Result<(), String>;
}

/// Inclusive lower bound.
#[derive(Debug, Clone)]
pub struct Min<T>(pub T);

/// Inclusive upper bound.
#[derive(Debug, Clone)]
pub struct Max<T>(pub T);

/// Inclusive range.
#[derive(Debug, Clone)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

/// Rejects empty strings and lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

/// Restricts the value to a fixed set.
#[derive(Debug, Clone)]
pub struct OneOf<T>(pub Vec<T>);

/// A named predicate.
pub struct Predicate<T> {
    description: String,
    test: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: PartialOrd + Debug + Send + Sync> Constraint<T> for Min<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if *value < self.0 {
            Err(format!("{value:?} is below the minimum {:?}", self.0))
        } else {
            Ok(())
        }
    }
}

impl<T: PartialOrd + Debug + Send + Sync> Constraint<T> for Max<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if *value > self.0 {
            Err(format!("{value:?} is above the maximum {:?}", self.0))
        } else {
            Ok(())
        }
    }
}

impl<T: PartialOrd + Debug + Send + Sync> Constraint<T> for Range<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if *value < self.min || *value > self.max {
            Err(format!("{value:?} is outside {:?}..={:?}", self.min, self.max))
        } else {
            Ok(())
        }
    }
}

impl Constraint<String> for NonEmpty {
    fn check(&self, value: &String) -> Result<(), String> {
        if value.is_empty() {
            Err("value must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

impl<E> Constraint<Vec<E>> for NonEmpty {
    fn check(&self, value: &Vec<E>) -> Result<(), String> {
        if value.is_empty() {
            Err("list must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

impl<T: PartialEq + Debug + Send + Sync> Constraint<T> for OneOf<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if self.0.contains(value) {
            Ok(())
        } else {
            Err(format!("{value:?} is not one of {:?}", self.0))
        }
    }
}

impl<T> Predicate<T> {
    pub fn new(description: impl Into<String>, test: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            description: description.into(),
            test: Box::new(test),
        }
    }
}

impl<T> Constraint<T> for Predicate<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if (self.test)(value) {
            Ok(())
        } else {
            Err(self.description.clone())
        }
    }
}

// ── Type-erased constraints ───────────────────────────────────────────────────

/// A constraint whose target type is only known at runtime.
#[derive(Clone)]
pub struct ConstraintRef {
    name: String,
    target: TypeId,
    target_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl std::fmt::Debug for ConstraintRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintRef")
            .field("name", &self.name)
            .field("target", &self.target_name)
            .finish()
    }
}

impl ConstraintRef {
    /// Erases `constraint`, which applies to values of type `T`.
    pub fn new<T: 'static>(name: impl Into<String>, constraint: impl Constraint<T> + 'static) -> Self {
        let typed: Arc<dyn Constraint<T>> = Arc::new(constraint);
        Self {
            name: name.into(),
            target: TypeId::of::<T>(),
            target_name: std::any::type_name::<T>(),
            inner: Arc::new(typed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the value type this constraint accepts.
    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    /// Recovers the typed constraint, or `None` if it targets another type.
    pub fn bind<T: 'static>(&self) -> Option<Arc<dyn Constraint<T>>> {
        if self.target != TypeId::of::<T>() {
            return None;
        }
        self.inner.downcast_ref::<Arc<dyn Constraint<T>>>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = Range { min: 0.0, max: 1.0 };

        assert!(range.check(&0.0).is_ok());
        assert!(range.check(&1.0).is_ok());
        assert!(range.check(&1.01).is_err());
        assert!(range.check(&-0.5).is_err());
    }

    #[test]
    fn test_min_and_max() {
        assert!(Min(3).check(&3).is_ok());
        assert!(Min(3).check(&2).is_err());
        assert!(Max(3).check(&4).is_err());
    }

    #[test]
    fn test_non_empty_for_strings_and_lists() {
        assert!(Constraint::<String>::check(&NonEmpty, &String::new()).is_err());
        assert!(Constraint::<Vec<u8>>::check(&NonEmpty, &vec![1]).is_ok());
    }

    #[test]
    fn test_one_of_reports_allowed_values() {
        let allowed = OneOf(vec!["dark".to_string(), "light".to_string()]);

        let err = allowed.check(&"blue".to_string()).unwrap_err();

        assert!(err.contains("dark"));
    }

    #[test]
    fn test_predicate_uses_description_as_reason() {
        let even = Predicate::new("must be even", |v: &u32| v % 2 == 0);
        assert_eq!(even.check(&3).unwrap_err(), "must be even");
    }

    #[test]
    fn test_constraint_ref_binds_only_to_its_target_type() {
        // Arrange
        let erased = ConstraintRef::new::<u32>("max-10", Max(10u32));

        // Act
        let same = erased.bind::<u32>();
        let other = erased.bind::<i64>();

        // Assert
        assert!(same.is_some_and(|c| c.check(&11).is_err()));
        assert!(other.is_none());
        assert_eq!(erased.target_name(), "u32");
    }
}
