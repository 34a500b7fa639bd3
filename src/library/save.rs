//! Infinite Library セーブ/ロード機能。
//!
//! ## 形式
//!
//! `SaveData { version, state }` を JSON で保存する。`Decimal` の値はすべて
//! `{"__decimal": "<mantissa>e<exponent>"}` というタグ付きオブジェクトになる
//! （f64 を超える桁でも情報を失わない）。読み込み時は `taggedDecimal` キー、
//! 素の数値、数値文字列も受け付ける。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! 互換バージョンのセーブデータは、不足フィールドにデフォルト値を補完して読み込む。
//! ジェネレーター・アップグレード・転生レイヤーは id で突き合わせ、未知の id は無視する。

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decimal::{Decimal, ParseDecimalError};

use super::logic::{recalculate_multipliers, refresh_unlocks};
use super::state::{LibraryState, Resources};

/// セーブデータのフォーマットバージョン。
/// フィールド追加時にインクリメントすること。
pub const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// デフォルトの保存キー。
pub const DEFAULT_STORAGE_KEY: &str = "infinite-library-save";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize save: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse save: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("save version {found} is older than the minimum supported {min}")]
    Incompatible { found: u32, min: u32 },
}

// ── タグ付き Decimal ──────────────────────────────────────────────

/// JSON 上の `Decimal`。書き出しは常にタグ付き形式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DecimalRepr", into = "TaggedDecimal")]
struct SavedDecimal(Decimal);

#[derive(Serialize)]
struct TaggedDecimal {
    #[serde(rename = "__decimal")]
    value: String,
}

/// 読み込み時に受け付ける表現。
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Tagged {
        #[serde(rename = "__decimal", alias = "taggedDecimal")]
        value: String,
    },
    Number(f64),
    Text(String),
}

impl From<SavedDecimal> for TaggedDecimal {
    fn from(d: SavedDecimal) -> Self {
        TaggedDecimal {
            value: d.0.to_string(),
        }
    }
}

impl TryFrom<DecimalRepr> for SavedDecimal {
    type Error = ParseDecimalError;

    /// NaN と無限大は壊れたデータとして拒否する。
    fn try_from(repr: DecimalRepr) -> Result<Self, Self::Error> {
        let (value, raw) = match repr {
            DecimalRepr::Tagged { value } | DecimalRepr::Text(value) => {
                (value.parse::<Decimal>()?, value)
            }
            DecimalRepr::Number(n) => (Decimal::from(n), n.to_string()),
        };
        if value.is_finite() && !value.is_nan() {
            Ok(SavedDecimal(value))
        } else {
            Err(ParseDecimalError(raw))
        }
    }
}

// ── ドキュメント ─────────────────────────────────────────────────

/// シリアライズ用のセーブデータ構造体。
/// 乗数キャッシュは保存せず、ロード時に購入済みアップグレードから再計算する。
#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    #[serde(default)]
    state: GameSave,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct GameSave {
    resources: ResourcesSave,
    generators: Vec<GeneratorSave>,
    upgrades: Vec<UpgradeSave>,
    prestige_layers: Vec<PrestigeLayerSave>,
    stats: StatsSave,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct ResourcesSave {
    glyphs: SavedDecimal,
    vocables: SavedDecimal,
    fragments: SavedDecimal,
    codex: SavedDecimal,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct GeneratorSave {
    id: String,
    owned: u32,
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct UpgradeSave {
    id: String,
    purchased: bool,
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct PrestigeLayerSave {
    id: String,
    times_reset: u32,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct StatsSave {
    total_glyphs_earned: SavedDecimal,
    glyphs_earned_this_run: SavedDecimal,
    total_clicks: u64,
    play_time: f64,
    last_save: i64,
}

/// LibraryState からセーブ用データを抽出する。
fn extract_save(state: &LibraryState) -> SaveData {
    let r = &state.resources;
    SaveData {
        version: SAVE_VERSION,
        state: GameSave {
            resources: ResourcesSave {
                glyphs: SavedDecimal(r.glyphs),
                vocables: SavedDecimal(r.vocables),
                fragments: SavedDecimal(r.fragments),
                codex: SavedDecimal(r.codex),
            },
            generators: state
                .generators
                .iter()
                .map(|g| GeneratorSave {
                    id: g.id.to_string(),
                    owned: g.owned,
                    unlocked: g.unlocked,
                })
                .collect(),
            upgrades: state
                .upgrades
                .iter()
                .map(|u| UpgradeSave {
                    id: u.id.to_string(),
                    purchased: u.purchased,
                    unlocked: u.unlocked,
                })
                .collect(),
            prestige_layers: state
                .prestige_layers
                .iter()
                .map(|l| PrestigeLayerSave {
                    id: l.id.to_string(),
                    times_reset: l.times_reset,
                })
                .collect(),
            stats: StatsSave {
                total_glyphs_earned: SavedDecimal(state.stats.total_glyphs_earned),
                glyphs_earned_this_run: SavedDecimal(state.stats.glyphs_earned_this_run),
                total_clicks: state.stats.total_clicks,
                play_time: state.stats.play_time,
                last_save: state.stats.last_save,
            },
        },
    }
}

/// セーブデータを初期状態に上書き適用し、乗数と解放状態を再計算する。
fn apply_save(state: &mut LibraryState, save: &GameSave) {
    *state = LibraryState::with_catalog(state.catalog);

    let non_negative = |d: SavedDecimal| d.0.max(Decimal::ZERO);
    state.resources = Resources {
        glyphs: non_negative(save.resources.glyphs),
        vocables: non_negative(save.resources.vocables),
        fragments: non_negative(save.resources.fragments),
        codex: non_negative(save.resources.codex),
    };

    for saved in &save.generators {
        if let Some(g) = state.generators.iter_mut().find(|g| g.id == saved.id) {
            g.owned = saved.owned;
            g.unlocked |= saved.unlocked;
        }
    }
    for saved in &save.upgrades {
        if let Some(u) = state.upgrades.iter_mut().find(|u| u.id == saved.id) {
            u.purchased = saved.purchased;
            u.unlocked = saved.unlocked || saved.purchased;
        }
    }
    for saved in &save.prestige_layers {
        if let Some(l) = state.prestige_layers.iter_mut().find(|l| l.id == saved.id) {
            l.times_reset = saved.times_reset;
        }
    }

    let stats = &save.stats;
    state.stats.total_glyphs_earned = non_negative(stats.total_glyphs_earned);
    state.stats.glyphs_earned_this_run = non_negative(stats.glyphs_earned_this_run);
    state.stats.total_clicks = stats.total_clicks;
    state.stats.play_time = if stats.play_time.is_finite() {
        stats.play_time.max(0.0)
    } else {
        0.0
    };
    state.stats.last_save = stats.last_save;

    recalculate_multipliers(state);
    refresh_unlocks(state);
}

/// ゲーム状態を JSON 文字列にする。
pub fn save_to_json(state: &LibraryState) -> Result<String, SaveError> {
    serde_json::to_string(&extract_save(state)).map_err(SaveError::Serialize)
}

/// JSON 文字列から状態を復元する。
/// エラー時は `state` に一切触れない。
pub fn load_from_json(state: &mut LibraryState, json: &str) -> Result<(), SaveError> {
    let save_data: SaveData = serde_json::from_str(json).map_err(SaveError::Parse)?;

    if save_data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            found: save_data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if save_data.version < SAVE_VERSION {
        info!(
            "旧バージョンのセーブデータをマイグレーション (saved={}, current={})",
            save_data.version, SAVE_VERSION
        );
    }

    apply_save(state, &save_data.state);
    Ok(())
}

// ── 保存先 ──────────────────────────────────────────────────────

/// キー付きの文字列ストレージ。
pub trait SaveSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn write(&self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove(&self, key: &str) -> Result<(), SaveError>;
}

/// メモリ上の保存先。ネイティブ実行とテスト用。
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: RefCell<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// ブラウザの localStorage。WASM 環境でのみ動作。
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageSlot {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageSlot {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveSlot for LocalStorageSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        self.storage
            .get_item(key)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        self.storage
            .remove_item(key)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }
}

// ── 公開 API ───────────────────────────────────────────────────

/// ゲーム状態を保存し、成功したら `stats.last_save` を `now_ms` に更新する。
pub fn save_game(
    state: &mut LibraryState,
    slot: &impl SaveSlot,
    key: &str,
    now_ms: i64,
) -> Result<(), SaveError> {
    let mut save_data = extract_save(state);
    save_data.state.stats.last_save = now_ms;
    let json = serde_json::to_string(&save_data).map_err(SaveError::Serialize)?;
    slot.write(key, &json)?;
    state.stats.last_save = now_ms;
    debug!("saved {} bytes to {}", json.len(), key);
    Ok(())
}

/// 保存先からゲーム状態を復元する。
/// データが無い場合、または壊れている場合は false を返す（新規ゲームになる）。
/// 壊れたデータと互換性の無いデータは削除する。
pub fn load_game(state: &mut LibraryState, slot: &impl SaveSlot, key: &str) -> bool {
    let json = match slot.read(key) {
        Ok(Some(j)) => j,
        Ok(None) => return false,
        Err(e) => {
            warn!("セーブデータの読み込みに失敗: {e}");
            return false;
        }
    };

    match load_from_json(state, &json) {
        Ok(()) => {
            info!("セーブデータを読み込みました ({key})");
            true
        }
        Err(e) => {
            warn!("セーブデータを破棄します: {e}");
            if let Err(e) = slot.remove(key) {
                warn!("セーブデータの削除に失敗: {e}");
            }
            false
        }
    }
}

/// セーブデータを削除する。
pub fn delete_save(slot: &impl SaveSlot, key: &str) -> Result<(), SaveError> {
    slot.remove(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::data::STANDARD_LAYER;
    use crate::library::logic::{add_resource, buy_generator, buy_upgrade, click, prestige, tick};

    const KEY: &str = DEFAULT_STORAGE_KEY;

    fn d(v: f64) -> Decimal {
        Decimal::from(v)
    }

    fn played_state() -> LibraryState {
        let mut state = LibraryState::new();
        add_resource(&mut state, d(12_000.0));
        for _ in 0..6 {
            assert!(buy_generator(&mut state, "quill"));
        }
        assert!(buy_generator(&mut state, "scribe"));
        assert!(buy_upgrade(&mut state, "ink_well"));
        assert!(buy_upgrade(&mut state, "sharpened_quills"));
        for _ in 0..5 {
            click(&mut state);
        }
        tick(&mut state, 2.5);
        state
    }

    #[test]
    fn save_then_load_restores_state() {
        let mut original = played_state();
        let slot = MemorySlot::new();
        save_game(&mut original, &slot, KEY, 1_700_000_000_000).unwrap();

        let mut restored = LibraryState::new();
        assert!(load_game(&mut restored, &slot, KEY));
        assert_eq!(restored, original);
        assert_eq!(restored.stats.last_save, 1_700_000_000_000);
    }

    #[test]
    fn load_recomputes_multipliers() {
        let mut original = played_state();
        let slot = MemorySlot::new();
        save_game(&mut original, &slot, KEY, 1).unwrap();

        let mut restored = LibraryState::new();
        assert!(load_game(&mut restored, &slot, KEY));
        assert!((restored.multipliers.click - 2.0).abs() < f64::EPSILON);
        assert!((restored.multipliers.generator("quill") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn save_only_touches_last_save() {
        let mut state = played_state();
        let before = state.clone();
        save_game(&mut state, &MemorySlot::new(), KEY, 42).unwrap();
        assert_eq!(state.stats.last_save, 42);
        state.stats.last_save = before.stats.last_save;
        assert_eq!(state, before);
    }

    #[test]
    fn decimals_are_tagged() {
        let mut state = LibraryState::new();
        state.resources.glyphs = Decimal::new(1.5, 400);
        let json = save_to_json(&state).unwrap();
        assert!(json.contains(r#""glyphs":{"__decimal":"1.5e400"}"#), "{json}");
        assert!(json.contains(r#""version":1"#));
    }

    #[test]
    fn huge_values_survive() {
        let mut state = LibraryState::new();
        state.resources.glyphs = Decimal::new(7.25, 12_345);
        state.stats.total_glyphs_earned = Decimal::new(9.5, 12_346);
        let json = save_to_json(&state).unwrap();

        let mut restored = LibraryState::new();
        load_from_json(&mut restored, &json).unwrap();
        assert_eq!(restored.resources.glyphs, state.resources.glyphs);
        assert_eq!(restored.stats.total_glyphs_earned, state.stats.total_glyphs_earned);
    }

    #[test]
    fn accepts_alternate_decimal_encodings() {
        let json = r#"{
            "version": 1,
            "state": {
                "resources": {
                    "glyphs": {"taggedDecimal": "2.5e3"},
                    "vocables": 4,
                    "fragments": "12",
                    "codex": {"__decimal": "0"}
                }
            }
        }"#;
        let mut state = LibraryState::new();
        load_from_json(&mut state, json).unwrap();
        assert_eq!(state.resources.glyphs, d(2_500.0));
        assert_eq!(state.resources.vocables, d(4.0));
        assert_eq!(state.resources.fragments, d(12.0));
        assert_eq!(state.resources.codex, Decimal::ZERO);
    }

    /// 不足フィールドはデフォルト値、未知のフィールドと id は無視される。
    #[test]
    fn missing_fields_default_and_unknown_ids_ignored() {
        let json = r#"{
            "version": 1,
            "state": {
                "generators": [
                    {"id": "quill", "owned": 12},
                    {"id": "retired_generator", "owned": 99}
                ],
                "upgrades": [
                    {"id": "ink_well", "purchased": true},
                    {"id": "gone", "purchased": true}
                ],
                "future_unknown_field": "should be ignored"
            }
        }"#;
        let mut state = LibraryState::new();
        load_from_json(&mut state, json).unwrap();
        assert_eq!(state.generator("quill").unwrap().owned, 12);
        assert!(state.is_upgrade_purchased("ink_well"));
        assert!((state.multipliers.click - 2.0).abs() < f64::EPSILON);
        assert_eq!(state.resources.glyphs, Decimal::ZERO);
        assert_eq!(state.stats.total_clicks, 0);
        assert_eq!(state.purchased_upgrades().len(), 1);
    }

    #[test]
    fn prestige_progress_survives() {
        let mut state = LibraryState::new();
        state.resources.glyphs = d(16_000.0);
        prestige(&mut state, STANDARD_LAYER);
        let json = save_to_json(&state).unwrap();

        let mut restored = LibraryState::new();
        load_from_json(&mut restored, &json).unwrap();
        assert_eq!(restored.resources.vocables, d(4.0));
        assert_eq!(restored.prestige_layer(STANDARD_LAYER).unwrap().times_reset, 1);
    }

    #[test]
    fn absent_slot_leaves_state_untouched() {
        let mut state = played_state();
        let before = state.clone();
        assert!(!load_game(&mut state, &MemorySlot::new(), KEY));
        assert_eq!(state, before);
    }

    #[test]
    fn corrupt_save_is_discarded() {
        let slot = MemorySlot::new();
        slot.write(KEY, "{not json").unwrap();
        let mut state = played_state();
        let before = state.clone();
        assert!(!load_game(&mut state, &slot, KEY));
        assert_eq!(state, before);
        assert_eq!(slot.read(KEY).unwrap(), None);
    }

    #[test]
    fn bad_decimal_is_a_parse_error() {
        let json = r#"{"version": 1, "state": {"resources": {"glyphs": {"__decimal": "lots"}}}}"#;
        let mut state = LibraryState::new();
        assert!(matches!(
            load_from_json(&mut state, json),
            Err(SaveError::Parse(_))
        ));
    }

    /// MIN_COMPATIBLE_VERSION 未満のバージョンは互換性なしと判定され、削除される。
    #[test]
    fn version_below_min_compatible_is_rejected() {
        let slot = MemorySlot::new();
        slot.write(KEY, r#"{"version": 0, "state": {}}"#).unwrap();
        let mut state = LibraryState::new();
        assert!(matches!(
            load_from_json(&mut state, r#"{"version": 0}"#),
            Err(SaveError::Incompatible { found: 0, min: MIN_COMPATIBLE_VERSION })
        ));
        assert!(!load_game(&mut state, &slot, KEY));
        assert_eq!(slot.read(KEY).unwrap(), None);
    }

    #[test]
    fn delete_save_clears_slot() {
        let slot = MemorySlot::new();
        let mut state = LibraryState::new();
        save_game(&mut state, &slot, KEY, 5).unwrap();
        assert!(slot.read(KEY).unwrap().is_some());
        delete_save(&slot, KEY).unwrap();
        assert!(!load_game(&mut state, &slot, KEY));
    }

    #[test]
    fn non_finite_decimals_discard_the_save() {
        for bad in [
            r#"{"__decimal": "NaN"}"#,
            r#"{"__decimal": "Infinity"}"#,
            r#"{"taggedDecimal": "-Infinity"}"#,
            r#""NaN""#,
        ] {
            let json = format!(r#"{{"version": 1, "state": {{"resources": {{"glyphs": {bad}}}}}}}"#);
            let slot = MemorySlot::new();
            slot.write(KEY, &json).unwrap();

            let mut state = LibraryState::new();
            assert!(!load_game(&mut state, &slot, KEY), "{json}");
            assert_eq!(state, LibraryState::new());
            assert_eq!(slot.read(KEY).unwrap(), None);

            for _ in 0..10 {
                click(&mut state);
            }
            assert!(buy_generator(&mut state, "quill"));
        }
    }

    #[test]
    fn negative_balances_are_clamped() {
        let json = r#"{"version": 1, "state": {"resources": {"glyphs": -50}}}"#;
        let mut state = LibraryState::new();
        load_from_json(&mut state, json).unwrap();
        assert_eq!(state.resources.glyphs, Decimal::ZERO);
    }
}
