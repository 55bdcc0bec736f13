use std::collections::HashSet;

/// Header checkbox state over the filtered rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Some,
    All,
}

/// Selected row ids. Only ever holds ids present in the current data.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn set(&mut self, id: &str, selected: bool) -> bool {
        if selected {
            self.ids.insert(id.to_string())
        } else {
            self.ids.remove(id)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Drop ids the predicate rejects; returns how many were dropped
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// All when every candidate is selected (and there is at least one),
    /// None when nothing at all is selected, Some otherwise
    pub fn state<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> SelectionState {
        if self.ids.is_empty() {
            return SelectionState::None;
        }
        let mut any = false;
        for id in candidates {
            any = true;
            if !self.ids.contains(id) {
                return SelectionState::Some;
            }
        }
        if any {
            SelectionState::All
        } else {
            SelectionState::Some
        }
    }
}
