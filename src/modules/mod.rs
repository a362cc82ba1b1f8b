pub mod books;

use shelf_kernel::ModuleRegistry;

use books::handlers::SharedStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) {
    registry.register(books::create_module(store));
}
