//! Macro para declarar la tabla de operaciones sin boilerplate por operación.
//!
//! Uso:
//! ```
//! use verdict_core::step_operations;
//!
//! let table = step_operations! {
//!     "open_account",
//!     "add_to_cart" { title: "Add {0} to the cart" },
//!     "pay_later" { pending },
//!     "legacy_checkout" { ignored, short_name: "Legacy checkout" },
//!     "purchase_journey" { group },
//! };
//! assert_eq!(table.len(), 5);
//! ```

/// Construye una `OperationTable` a partir de declaraciones por operación.
/// Propiedades soportadas: `title: "..."`, `short_name: "..."`, `pending`,
/// `ignored`, `group`.
#[macro_export]
macro_rules! step_operations {
    ( $( $id:literal $( { $($props:tt)* } )? ),* $(,)? ) => {{
        let mut table = $crate::intercept::OperationTable::new();
        $(
            #[allow(unused_mut)]
            let mut meta = $crate::intercept::OperationMeta::new($id);
            $( $crate::step_operations!(@props meta, $($props)*); )?
            table.insert(meta);
        )*
        table
    }};

    (@props $meta:ident, ) => {};
    (@props $meta:ident, title: $value:literal $(, $($rest:tt)*)? ) => {
        $meta.title = Some($value.to_string());
        $( $crate::step_operations!(@props $meta, $($rest)*); )?
    };
    (@props $meta:ident, short_name: $value:literal $(, $($rest:tt)*)? ) => {
        $meta.short_name = Some($value.to_string());
        $( $crate::step_operations!(@props $meta, $($rest)*); )?
    };
    (@props $meta:ident, pending $(, $($rest:tt)*)? ) => {
        $meta.pending = true;
        $( $crate::step_operations!(@props $meta, $($rest)*); )?
    };
    (@props $meta:ident, ignored $(, $($rest:tt)*)? ) => {
        $meta.ignored = true;
        $( $crate::step_operations!(@props $meta, $($rest)*); )?
    };
    (@props $meta:ident, group $(, $($rest:tt)*)? ) => {
        $meta.group = true;
        $( $crate::step_operations!(@props $meta, $($rest)*); )?
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macro_builds_resolved_metadata_records() {
        let table = step_operations! {
            "open_account",
            "add_to_cart" { title: "Add {0} to the cart" },
            "pay_later" { pending },
            "legacy_checkout" { ignored, short_name: "Legacy checkout" },
            "purchase_journey" { group },
        };

        assert_eq!(table.len(), 5);
        assert!(table.get("open_account").expect("declared").title.is_none());
        assert_eq!(table.get("add_to_cart").expect("declared").title.as_deref(),
                   Some("Add {0} to the cart"));
        assert!(table.get("pay_later").expect("declared").pending);
        let legacy = table.get("legacy_checkout").expect("declared");
        assert!(legacy.ignored);
        assert_eq!(legacy.short_name.as_deref(), Some("Legacy checkout"));
        assert!(table.get("purchase_journey").expect("declared").group);
    }
}
