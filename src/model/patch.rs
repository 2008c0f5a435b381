//! Partial-update patches for model records.

/// A partial update that can be merged into a record.
///
/// Fields present in the patch overwrite the corresponding record
/// fields; absent fields leave the record untouched.
pub trait Patch<T> {
    /// Merge this patch into `target`.
    fn apply_to(&self, target: &mut T);

    /// Whether the patch carries no fields at all.
    fn is_empty(&self) -> bool;
}

/// Declares a patch struct for a record.
///
/// `required` fields map `Option<T>` onto a `T` field, `optional` fields
/// map `Option<T>` onto an `Option<T>` field.
macro_rules! patch_struct {
    (
        $(#[$meta:meta])*
        $patch:ident for $target:ident {
            required { $($req:ident: $req_ty:ty),* $(,)? }
            optional { $($opt:ident: $opt_ty:ty),* $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $patch {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $req: Option<$req_ty>,
            )*
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $opt: Option<$opt_ty>,
            )*
        }

        impl $crate::model::Patch<$target> for $patch {
            fn apply_to(&self, target: &mut $target) {
                $(
                    if let Some(value) = &self.$req {
                        target.$req = value.clone();
                    }
                )*
                $(
                    if let Some(value) = &self.$opt {
                        target.$opt = Some(value.clone());
                    }
                )*
            }

            fn is_empty(&self) -> bool {
                true $(&& self.$req.is_none())* $(&& self.$opt.is_none())*
            }
        }
    };
}
