// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `computed` and `invalidated` notification lists.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use understory_region::Rect;

/// Handle returned when a listener is connected, used to disconnect it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Computed = Box<dyn FnMut(Rect)>;
type Invalidated = Box<dyn FnMut()>;

/// Listeners of one projection, called in connection order.
#[derive(Default)]
pub(crate) struct Listeners {
    computed: Vec<(ListenerId, Computed)>,
    invalidated: Vec<(ListenerId, Invalidated)>,
    next: u64,
}

impl Listeners {
    pub(crate) fn on_computed(&mut self, f: impl FnMut(Rect) + 'static) -> ListenerId {
        let id = self.allocate();
        self.computed.push((id, Box::new(f)));
        id
    }

    pub(crate) fn on_invalidated(&mut self, f: impl FnMut() + 'static) -> ListenerId {
        let id = self.allocate();
        self.invalidated.push((id, Box::new(f)));
        id
    }

    /// Returns `true` if `id` was connected.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.computed.len() + self.invalidated.len();
        self.computed.retain(|(l, _)| *l != id);
        self.invalidated.retain(|(l, _)| *l != id);
        before != self.computed.len() + self.invalidated.len()
    }

    pub(crate) fn computed(&mut self, rect: Rect) {
        for (_, f) in &mut self.computed {
            f(rect);
        }
    }

    pub(crate) fn invalidated(&mut self) {
        for (_, f) in &mut self.invalidated {
            f();
        }
    }

    fn allocate(&mut self) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        id
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("computed", &self.computed.len())
            .field("invalidated", &self.invalidated.len())
            .field("next", &self.next)
            .finish()
    }
}
