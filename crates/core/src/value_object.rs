//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values.
/// A `Category` or a `BalanceSummary` is a value object; an `Expense` with its
/// `ExpenseId` is an entity.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Share {
///     person: PersonId,
///     amount: Decimal,
/// }
///
/// impl ValueObject for Share {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
