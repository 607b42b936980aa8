//! Browser facade
//!
//! The JS shell owns rendering, menus and storage. It drives one `WebArena`
//! per page: one-shot inputs are latched between frames, structured values
//! cross the boundary as JSON strings.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::{GoldLedger, to_json};
use crate::sim::{Arena, EnemyKind, PickupKind, TickInput, UpgradeOffer, tick};
use crate::{Bounds, MetaProgress, MetaUpgrade, Tuning};

/// Install the panic hook and route `log` to the browser console
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Cell Survival core loaded");
}

#[derive(Serialize)]
struct EnemyView {
    id: u32,
    kind: EnemyKind,
    pos: Vec2,
    radius: f32,
    hp_fraction: f32,
}

#[derive(Serialize)]
struct PickupView {
    kind: PickupKind,
    pos: Vec2,
    radius: f32,
}

#[derive(Serialize)]
struct ProjectileView {
    pos: Vec2,
    angle: f32,
    radius: f32,
    explosive: bool,
}

/// Everything the renderer draws in one frame
#[derive(Serialize)]
struct SceneView {
    width: f32,
    height: f32,
    player: Vec2,
    player_radius: f32,
    invincible: bool,
    attack_zone: f32,
    enemies: Vec<EnemyView>,
    projectiles: Vec<ProjectileView>,
    pickups: Vec<PickupView>,
}

#[wasm_bindgen]
pub struct WebArena {
    arena: Arena,
    meta: MetaProgress,
    input: TickInput,
    ledger: GoldLedger,
}

#[wasm_bindgen]
impl WebArena {
    /// Create an arena. `tuning_json` overrides the built-in balance sheet.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: Option<String>) -> Result<WebArena, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        Ok(Self {
            arena: Arena::new(seed, tuning),
            meta: MetaProgress::default(),
            input: TickInput::default(),
            ledger: GoldLedger::default(),
        })
    }

    pub fn start_run(&mut self) {
        self.ledger.close_run(&self.arena, &mut self.meta);
        self.arena.start_run(&self.meta);
        self.input = TickInput::default();
    }

    /// Abandon the run; gold picked up so far is kept
    pub fn quit(&mut self) {
        self.ledger.close_run(&self.arena, &mut self.meta);
        self.arena.quit();
    }

    /// Movement from keyboard/joystick; need not be normalized
    pub fn set_direction(&mut self, x: f32, y: f32) {
        self.input.direction = Vec2::new(x, y);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Toggle pause on the next frame
    pub fn request_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn resume(&mut self) {
        self.arena.resume();
    }

    /// Advance by one host frame and return the HUD snapshot as JSON
    pub fn tick(&mut self, dt_ms: f64) -> String {
        let snapshot = tick(&mut self.arena, &self.input, dt_ms);
        self.input.pause = false;
        self.ledger.settle(&self.arena, &mut self.meta);
        to_json(&snapshot)
    }

    /// JSON array of cards, or `null` when no menu is open
    pub fn level_up_offers(&self) -> String {
        to_json(&self.arena.level_up_offers())
    }

    /// Pick the card at `index` of the current menu
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        let offer = self
            .arena
            .level_up_offers()
            .and_then(|offers| offers.get(index).copied());
        match offer {
            Some(offer) => self.arena.choose_upgrade(&offer),
            None => {
                log::warn!("No upgrade card at index {}", index);
                false
            }
        }
    }

    /// Card text for the menu: `[{title, description}]`
    pub fn offer_labels(&self) -> String {
        #[derive(Serialize)]
        struct Label {
            title: String,
            description: String,
        }
        let labels: Vec<Label> = self
            .arena
            .level_up_offers()
            .unwrap_or(&[])
            .iter()
            .map(|o: &UpgradeOffer| Label {
                title: o.title(),
                description: o.description(),
            })
            .collect();
        to_json(&labels)
    }

    pub fn outcome(&self) -> String {
        to_json(&self.arena.outcome())
    }

    pub fn drain_events(&mut self) -> String {
        to_json(&self.arena.drain_events())
    }

    pub fn scene(&self) -> String {
        let a = &self.arena;
        let scene = SceneView {
            width: a.bounds.width,
            height: a.bounds.height,
            player: a.player.pos,
            player_radius: a.player.radius,
            invincible: a.player.is_invincible(a.elapsed_ms),
            attack_zone: a.attack_zone(),
            enemies: a
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    radius: e.radius,
                    hp_fraction: (e.hp / e.max_hp).clamp(0.0, 1.0),
                })
                .collect(),
            projectiles: a
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.pos,
                    angle: p.angle(),
                    radius: p.radius,
                    explosive: p.is_explosive(),
                })
                .collect(),
            pickups: a
                .pickups
                .iter()
                .map(|p| PickupView {
                    kind: p.kind,
                    pos: p.pos,
                    radius: p.radius,
                })
                .collect(),
        };
        to_json(&scene)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.arena.resize(Bounds::new(width, height));
    }

    /// Meta-progress as JSON, for the shell to persist
    pub fn meta(&self) -> String {
        to_json(&self.meta)
    }

    /// Restore meta-progress saved by the shell
    pub fn load_meta(&mut self, json: &str) -> Result<(), JsValue> {
        self.meta = serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Loaded meta-progress ({} gold)", self.meta.gold);
        Ok(())
    }

    /// Current price of a shop item, by name (e.g. `"Damage"`)
    pub fn shop_cost(&self, item: &str) -> Result<u32, JsValue> {
        Ok(self.meta.cost(parse_item(item)?))
    }

    /// Buy a shop item; returns the gold spent
    pub fn purchase(&mut self, item: &str) -> Result<u32, JsValue> {
        let item = parse_item(item)?;
        self.meta
            .purchase(item)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn parse_item(name: &str) -> Result<MetaUpgrade, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| JsValue::from_str(&format!("unknown shop item: {}", name)))
}
