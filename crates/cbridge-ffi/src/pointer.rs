//! Native pointer values behind struct-pointer handles.

use cbridge_core::NativePointerType;

use crate::binding::{NativePointer, StructPointerHandle, SymbolResolver};
use crate::error::Result;

/// Static access to pointer values for native pointer types.
pub trait StructPointerAccess {
    /// Native pointer held by `handle`, obtained from the runtime resolver.
    ///
    /// Memory is never read here.
    fn get_pointer(
        handle: &StructPointerHandle,
        resolver: &dyn SymbolResolver,
    ) -> Result<NativePointer>;
}

impl StructPointerAccess for NativePointerType {
    fn get_pointer(
        handle: &StructPointerHandle,
        resolver: &dyn SymbolResolver,
    ) -> Result<NativePointer> {
        tracing::debug!(cname = %handle.cname, token = handle.token, "extracting struct pointer");
        resolver.struct_pointer(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SymbolTable;
    use crate::error::FfiError;

    #[test]
    fn delegates_to_resolver() {
        let mut table = SymbolTable::new();
        table.insert_struct(1, 0x7000);
        let handle = StructPointerHandle {
            cname: "struct Head".to_string(),
            token: 1,
        };
        let ptr = NativePointerType::get_pointer(&handle, &table).unwrap();
        assert_eq!(ptr, NativePointer::new(0x7000));
    }

    #[test]
    fn resolver_failure_propagates() {
        let table = SymbolTable::new();
        let handle = StructPointerHandle {
            cname: "struct Head".to_string(),
            token: 2,
        };
        assert!(matches!(
            NativePointerType::get_pointer(&handle, &table),
            Err(FfiError::Resolver { .. })
        ));
    }
}
