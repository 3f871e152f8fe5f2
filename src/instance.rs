use crate::{
    load_order,
    mods::{Mod, ModId, ModKind},
    tool::Tool,
};
use std::{collections::HashMap, path::PathBuf};

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    kind: ModKind,
    entry: Option<Mod>,
}

/// Mods live in an arena of slots. A slot is bound to a display name (per
/// kind, so a separator may share its name with a regular mod) for the
/// lifetime of the instance, so ids handed out for a name, including ids
/// reserved before the mod arrives, keep pointing at that logical mod.
/// Sequence position in `order` is the only priority information.
#[derive(Debug, Clone)]
pub struct Instance {
    pub display_name: String,
    pub game_folder: PathBuf,
    pub order_matters: bool,
    pub separate_save_games: bool,
    pub separate_ini_files: bool,
    slots: Vec<Slot>,
    by_name: HashMap<String, ModId>,
    order: Vec<ModId>,
    tools: Vec<Tool>,
}

impl Instance {
    pub fn new(display_name: impl Into<String>, game_folder: PathBuf) -> Self {
        Self {
            display_name: display_name.into(),
            game_folder,
            order_matters: true,
            separate_save_games: false,
            separate_ini_files: false,
            slots: Vec::new(),
            by_name: HashMap::new(),
            order: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_mods(
        display_name: impl Into<String>,
        game_folder: PathBuf,
        mods: impl IntoIterator<Item = Mod>,
    ) -> Self {
        let mut instance = Self::new(display_name, game_folder);
        for mod_entry in mods {
            instance.push_mod(mod_entry);
        }
        instance
    }

    pub fn mod_ids(&self) -> &[ModId] {
        &self.order
    }

    pub fn mods(&self) -> impl Iterator<Item = (ModId, &Mod)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|mod_entry| (*id, mod_entry)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: ModId) -> Option<&Mod> {
        self.slots.get(id.0).and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: ModId) -> Option<&mut Mod> {
        self.slots.get_mut(id.0).and_then(|slot| slot.entry.as_mut())
    }

    pub fn position(&self, id: ModId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    pub fn id_of(&self, name: &str, kind: ModKind) -> Option<ModId> {
        self.by_name.get(&slot_key(name, kind)).copied()
    }

    pub fn reserve(&mut self, name: &str, kind: ModKind) -> ModId {
        if let Some(id) = self.id_of(name, kind) {
            return id;
        }
        let id = ModId(self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            kind,
            entry: None,
        });
        self.by_name.insert(slot_key(name, kind), id);
        id
    }

    pub fn push_mod(&mut self, mod_entry: Mod) -> ModId {
        let id = self.reserve(&mod_entry.display_name, mod_entry.kind);
        let slot = &mut self.slots[id.0];
        if slot.entry.is_none() {
            self.order.push(id);
        }
        slot.entry = Some(mod_entry);
        id
    }

    /// Takes the mod out of the sequence. Its id and any references to it
    /// stay behind and resolve to nothing.
    pub fn remove(&mut self, id: ModId) -> Option<Mod> {
        let removed = self.slots.get_mut(id.0)?.entry.take()?;
        self.order.retain(|candidate| *candidate != id);
        Some(removed)
    }

    pub fn name_of(&self, id: ModId) -> Option<&str> {
        self.slots.get(id.0).map(|slot| slot.name.as_str())
    }

    pub fn kind_of(&self, id: ModId) -> Option<ModKind> {
        self.slots.get(id.0).map(|slot| slot.kind)
    }

    pub fn translate_id(&mut self, other: &Instance, id: ModId) -> Option<ModId> {
        let name = other.name_of(id)?;
        let kind = other.kind_of(id)?;
        Some(self.reserve(name, kind))
    }

    pub fn installed_mod(&self, mod_entry: &Mod) -> Option<(ModId, &Mod)> {
        let id = self.id_of(&mod_entry.display_name, mod_entry.kind)?;
        self.get(id).map(|existing| (id, existing))
    }

    pub fn installed_mod_mut(&mut self, mod_entry: &Mod) -> Option<&mut Mod> {
        let id = self.id_of(&mod_entry.display_name, mod_entry.kind)?;
        self.get_mut(id)
    }

    pub fn load_order(&self) -> Vec<ModId> {
        self.load_order_with(self.order_matters)
    }

    pub fn load_order_with(&self, trust_current_order: bool) -> Vec<ModId> {
        load_order::resolve_load_order(
            &self.order,
            |id| {
                self.get(id)
                    .map(|mod_entry| mod_entry.mod_conflicts.as_slice())
                    .unwrap_or(&[])
            },
            trust_current_order,
        )
    }

    pub fn load_order_mods(&self) -> Vec<&Mod> {
        self.load_order()
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    pub fn overwrite_mod(&self) -> Option<(ModId, &Mod)> {
        self.mods()
            .find(|(_, mod_entry)| mod_entry.kind == ModKind::Overwrite)
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn has_tool(&self, tool: &Tool) -> bool {
        self.tools.contains(tool)
    }

    pub fn add_tool(&mut self, tool: Tool) -> bool {
        if self.has_tool(&tool) {
            return false;
        }
        self.tools.push(tool);
        true
    }
}

fn slot_key(name: &str, kind: ModKind) -> String {
    match kind {
        ModKind::Regular => name.to_string(),
        ModKind::Separator => format!("{name}\u{0}separator"),
        ModKind::Overwrite => format!("{name}\u{0}overwrite"),
    }
}
