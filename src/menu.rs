use crate::state::{FillMode, ModeChoice, ModelId, Projection, ShadeMode};
use crossterm::event::{KeyCode, KeyEvent};

/// Row entry in a drop-down menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    /// Radio item; its group is the variant of `ModeChoice`
    Item {
        label: &'static str,
        choice: ModeChoice,
    },
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: &'static str,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn width(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                MenuEntry::Item { label, .. } => label.chars().count(),
                MenuEntry::Separator => 0,
            })
            .max()
            .unwrap_or(0)
            + 6
    }

    fn is_item(&self, index: usize) -> bool {
        matches!(self.entries.get(index), Some(MenuEntry::Item { .. }))
    }
}

fn item(label: &'static str, choice: ModeChoice) -> MenuEntry {
    MenuEntry::Item { label, choice }
}

/// The "Shapes" and "Render Options" menus
pub fn menus() -> Vec<Menu> {
    vec![
        Menu {
            title: "Shapes",
            entries: ModelId::ALL
                .iter()
                .map(|&id| item(id.label(), ModeChoice::Model(id)))
                .collect(),
        },
        Menu {
            title: "Render Options",
            entries: vec![
                item("White Faces", ModeChoice::Shade(ShadeMode::Flat)),
                item("Customize Faces", ModeChoice::Shade(ShadeMode::Custom)),
                MenuEntry::Separator,
                item("Draw Faces Only", ModeChoice::Fill(FillMode::FacesOnly)),
                item("Draw Edges Only", ModeChoice::Fill(FillMode::EdgesOnly)),
                item("Draw Both", ModeChoice::Fill(FillMode::Both)),
                MenuEntry::Separator,
                item(
                    "Perspective Projection",
                    ModeChoice::Projection(Projection::Perspective),
                ),
                item(
                    "Orthographic Projection",
                    ModeChoice::Projection(Projection::Orthographic),
                ),
            ],
        },
    ]
}

/// Outcome of feeding an input event to the menu bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResponse {
    /// Not a menu event; the caller should handle it
    Ignored,
    /// Menu navigation happened
    Consumed,
    Selected(ModeChoice),
}

/// Menu bar with at most one open drop-down
#[derive(Debug, Clone)]
pub struct MenuBar {
    menus: Vec<Menu>,
    /// Open menu and highlighted entry
    open: Option<(usize, usize)>,
}

impl MenuBar {
    pub fn new() -> Self {
        MenuBar {
            menus: menus(),
            open: None,
        }
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn open_menu(&self) -> Option<(usize, usize)> {
        self.open
    }

    pub fn open(&mut self, menu: usize) {
        let first = (0..self.menus[menu].entries.len())
            .find(|&i| self.menus[menu].is_item(i))
            .unwrap_or(0);
        self.open = Some((menu, first));
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    fn toggle(&mut self, menu: usize) {
        if self.open.map(|(open, _)| open) == Some(menu) {
            self.close();
        } else {
            self.open(menu);
        }
    }

    /// Column span `[start, end)` of a title on the menu bar row
    pub fn title_span(&self, menu: usize) -> (usize, usize) {
        let mut start = 1;
        for m in &self.menus[..menu] {
            start += m.title.chars().count() + 4;
        }
        (start, start + self.menus[menu].title.chars().count() + 2)
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> MenuResponse {
        if let KeyCode::F(n @ 1..=2) = event.code {
            self.toggle(usize::from(n - 1));
            return MenuResponse::Consumed;
        }

        let Some((menu, highlighted)) = self.open else {
            return MenuResponse::Ignored;
        };
        match event.code {
            KeyCode::Esc => self.close(),
            KeyCode::Up => self.move_highlight(menu, highlighted, -1),
            KeyCode::Down => self.move_highlight(menu, highlighted, 1),
            KeyCode::Left => self.open((menu + self.menus.len() - 1) % self.menus.len()),
            KeyCode::Right => self.open((menu + 1) % self.menus.len()),
            KeyCode::Enter | KeyCode::Char(' ') => return self.select(menu, highlighted),
            _ => {}
        }
        MenuResponse::Consumed
    }

    fn move_highlight(&mut self, menu: usize, from: usize, direction: isize) {
        let len = self.menus[menu].entries.len() as isize;
        let mut index = from as isize;
        for _ in 0..len {
            index = (index + direction).rem_euclid(len);
            if self.menus[menu].is_item(index as usize) {
                self.open = Some((menu, index as usize));
                return;
            }
        }
    }

    fn select(&mut self, menu: usize, entry: usize) -> MenuResponse {
        match self.menus[menu].entries.get(entry) {
            Some(MenuEntry::Item { choice, .. }) => {
                let choice = *choice;
                self.close();
                MenuResponse::Selected(choice)
            }
            _ => MenuResponse::Consumed,
        }
    }

    /// Handles a left click at a cell position
    pub fn handle_click(&mut self, column: usize, row: usize) -> MenuResponse {
        if row == 0 {
            for menu in 0..self.menus.len() {
                let (start, end) = self.title_span(menu);
                if (start..end).contains(&column) {
                    self.toggle(menu);
                    return MenuResponse::Consumed;
                }
            }
            return MenuResponse::Ignored;
        }

        let Some((menu, _)) = self.open else {
            return MenuResponse::Ignored;
        };
        let (start, _) = self.title_span(menu);
        let width = self.menus[menu].width();
        let entry = row - 1;
        if (start..start + width).contains(&column) && entry < self.menus[menu].entries.len() {
            return self.select(menu, entry);
        }
        // a click outside the drop-down dismisses it
        self.close();
        MenuResponse::Consumed
    }
}

impl Default for MenuBar {
    fn default() -> Self {
        Self::new()
    }
}
