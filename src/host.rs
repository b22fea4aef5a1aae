//! Providers of the two analysis contexts the cache reads from.

use crate::program::Program;
use std::cell::RefCell;
use std::rc::Rc;

/// Supplies the primary program and the optional installed-packages program.
///
/// Both are asked for lazily: rehydration re-resolves handles against whatever
/// program is current at that moment.
pub trait ExportMapHost {
    fn current_program(&self) -> Option<Rc<dyn Program>>;

    /// Program of installed but unreferenced packages (package.json auto-import provider).
    fn installed_packages_program(&self) -> Option<Rc<dyn Program>> {
        None
    }
}

/// Host whose programs can be swapped as the session produces new generations.
#[derive(Default)]
pub struct SharedHost {
    primary: RefCell<Option<Rc<dyn Program>>>,
    installed_packages: RefCell<Option<Rc<dyn Program>>>,
}

impl SharedHost {
    pub fn new(primary: Rc<dyn Program>) -> Self {
        Self {
            primary: RefCell::new(Some(primary)),
            installed_packages: RefCell::new(None),
        }
    }

    pub fn set_program(&self, program: Option<Rc<dyn Program>>) {
        *self.primary.borrow_mut() = program;
    }

    pub fn set_installed_packages_program(&self, program: Option<Rc<dyn Program>>) {
        *self.installed_packages.borrow_mut() = program;
    }
}

impl ExportMapHost for SharedHost {
    fn current_program(&self) -> Option<Rc<dyn Program>> {
        self.primary.borrow().clone()
    }

    fn installed_packages_program(&self) -> Option<Rc<dyn Program>> {
        self.installed_packages.borrow().clone()
    }
}
