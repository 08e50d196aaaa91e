use serde_json::{Map, Value};

/// Class box padding used when `class.padding` is not configured.
pub const DEFAULT_CLASS_PADDING: f64 = 12.0;

pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Raw configuration tree, read through dotted paths such as `class.padding`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassboxConfig(Value);

impl Default for ClassboxConfig {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl ClassboxConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        dotted_path
            .split('.')
            .try_fold(&self.0, |cur, key| cur.as_object()?.get(key))
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.lookup(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .or_else(|| v.as_u64().map(|n| n as f64))
    }

    /// Copy of this tree with `overrides` layered on top.
    ///
    /// Objects merge key by key; any other override value replaces what it lands on. A
    /// `null` override leaves the tree unchanged.
    pub fn with_overrides(&self, overrides: &Value) -> Self {
        let mut merged = self.0.clone();
        if !overrides.is_null() {
            overlay(&mut merged, overrides);
        }
        Self(merged)
    }
}

fn overlay(target: &mut Value, layer: &Value) {
    let (Value::Object(target_map), Value::Object(layer_map)) = (&mut *target, layer) else {
        *target = layer.clone();
        return;
    };
    for (key, value) in layer_map {
        match target_map.get_mut(key) {
            Some(slot) => overlay(slot, value),
            None => {
                target_map.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Theme colors consulted when a node carries no explicit `fill`/`stroke`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefaults {
    pub main_bkg: String,
    pub node_border: String,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            main_bkg: "#ECECFF".to_string(),
            node_border: "#9370DB".to_string(),
        }
    }
}

/// Resolved class box settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBoxConfig {
    pub padding: f64,
    pub html_labels: bool,
    pub hide_empty_members_box: bool,
    pub font_size: f64,
    pub font_family: Option<String>,
    pub theme: ThemeDefaults,
    pub hand_drawn_seed: u64,
}

impl Default for ClassBoxConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_CLASS_PADDING,
            html_labels: true,
            hide_empty_members_box: false,
            font_size: DEFAULT_FONT_SIZE,
            font_family: None,
            theme: ThemeDefaults::default(),
            hand_drawn_seed: 0,
        }
    }
}

impl ClassBoxConfig {
    pub fn from_config(cfg: &ClassboxConfig) -> Self {
        let defaults = Self::default();
        let padding = cfg
            .get_f64("class.padding")
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(defaults.padding);
        let html_labels = cfg
            .get_bool("class.htmlLabels")
            .or_else(|| cfg.get_bool("htmlLabels"))
            .unwrap_or(defaults.html_labels);
        let font_size = cfg
            .get_f64("fontSize")
            .or_else(|| cfg.get_f64("class.fontSize"))
            .filter(|s| s.is_finite())
            .unwrap_or(defaults.font_size)
            .max(1.0);
        let theme = ThemeDefaults {
            main_bkg: cfg
                .get_str("themeVariables.mainBkg")
                .map(str::to_string)
                .unwrap_or(defaults.theme.main_bkg),
            node_border: cfg
                .get_str("themeVariables.nodeBorder")
                .map(str::to_string)
                .unwrap_or(defaults.theme.node_border),
        };

        Self {
            padding,
            html_labels,
            hide_empty_members_box: cfg
                .get_bool("class.hideEmptyMembersBox")
                .unwrap_or(defaults.hide_empty_members_box),
            font_size,
            font_family: cfg.get_str("fontFamily").map(str::to_string),
            theme,
            hand_drawn_seed: cfg
                .get_f64("handDrawnSeed")
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(|s| s as u64)
                .unwrap_or(defaults.hand_drawn_seed),
        }
    }

    /// Vertical gap between sections. Class boxes use the padding for both.
    pub fn gap(&self) -> f64 {
        self.padding
    }
}
