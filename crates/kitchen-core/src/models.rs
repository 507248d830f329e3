use crate::errors::{KitchenError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Measurement unit of an ingredient. The wire format is the short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "ml")]
    Milliliters,
    #[serde(rename = "l")]
    Liters,
    #[serde(rename = "u")]
    Units,
    #[serde(rename = "cup")]
    Cups,
    #[serde(rename = "tbsp")]
    Tablespoons,
    #[serde(rename = "tsp")]
    Teaspoons,
}

/// Coarse family a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Weight,
    Volume,
    Count,
    SpoonMeasure,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Grams,
        Unit::Kilograms,
        Unit::Milliliters,
        Unit::Liters,
        Unit::Units,
        Unit::Cups,
        Unit::Tablespoons,
        Unit::Teaspoons,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Milliliters => "ml",
            Unit::Liters => "l",
            Unit::Units => "u",
            Unit::Cups => "cup",
            Unit::Tablespoons => "tbsp",
            Unit::Teaspoons => "tsp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Grams => "Grams",
            Unit::Kilograms => "Kilograms",
            Unit::Milliliters => "Milliliters",
            Unit::Liters => "Liters",
            Unit::Units => "Units",
            Unit::Cups => "Cups",
            Unit::Tablespoons => "Tablespoons",
            Unit::Teaspoons => "Teaspoons",
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Grams | Unit::Kilograms => UnitKind::Weight,
            Unit::Milliliters | Unit::Liters => UnitKind::Volume,
            Unit::Units => UnitKind::Count,
            Unit::Cups | Unit::Tablespoons | Unit::Teaspoons => UnitKind::SpoonMeasure,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = KitchenError;

    /// Accepts either the short code (`kg`) or the label (`kilograms`), case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.code() == needle || unit.label().to_lowercase() == needle)
            .ok_or_else(|| {
                KitchenError::invalid(format!(
                    "Unknown unit '{}'. Expected one of: g, kg, ml, l, u, cup, tbsp, tsp",
                    s
                ))
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: Unit,
    /// Server-side label for the unit, when the API supplied one.
    pub unit_display: Option<String>,
    pub cost_per_unit: Decimal,
    pub current_stock: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ingredient {
    pub fn unit_label(&self) -> &str {
        self.unit_display.as_deref().unwrap_or_else(|| self.unit.label())
    }
}

/// One ingredient-quantity pairing. Cost, stock and unit are looked up in the
/// catalog at computation time and are never copied here.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecipeLineItem {
    pub ingredient_id: i64,
    pub quantity: Decimal,
}

impl RecipeLineItem {
    pub fn new(ingredient_id: i64, quantity: Decimal) -> Self {
        Self {
            ingredient_id,
            quantity,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub yield_portions: u32,
    /// Minutes.
    pub preparation_time: Option<u32>,
    pub line_items: Vec<RecipeLineItem>,
}

/// A recipe as listed by the API, together with the figures the server computed.
#[derive(Debug, Clone)]
pub struct RecipeInfo {
    pub recipe: Recipe,
    pub batch_cost: Decimal,
    pub cost_per_portion: Decimal,
    pub producible_portions: u32,
    pub ingredients: Vec<RecipeIngredientInfo>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RecipeIngredientInfo {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub total_cost: Decimal,
    pub available_stock: Decimal,
    pub is_sufficient: bool,
}

// Raw API response structures for parsing
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiIngredientResponse {
    pub id: i64,
    pub name: String,
    pub unit: Unit,
    pub unit_display: Option<String>,
    pub cost_per_unit: Decimal,
    #[serde(default)]
    pub current_stock: Decimal,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>, // Catch unknown fields
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiRecipeIngredientResponse {
    pub id: Option<i64>,
    pub ingredient: i64,
    #[serde(default)]
    pub ingredient_name: String,
    #[serde(default)]
    pub ingredient_unit: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub available_stock: Decimal,
    #[serde(default)]
    pub is_sufficient: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiRecipeResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub yield_portions: u32,
    pub preparation_time: Option<u32>,
    #[serde(default)]
    pub batch_cost: Decimal,
    #[serde(default)]
    pub cost_per_portion: Decimal,
    #[serde(default)]
    pub producible_portions: u32,
    #[serde(default)]
    pub ingredients: Vec<ApiRecipeIngredientResponse>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>, // Catch unknown fields
}

/// Server-side `cost_breakdown` action payload.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CostBreakdownResponse {
    pub recipe_name: String,
    pub yield_portions: u32,
    pub batch_cost: Decimal,
    pub cost_per_portion: Decimal,
    pub ingredients: Vec<CostBreakdownEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CostBreakdownEntry {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub total_cost: Decimal,
    pub percentage_of_total: Decimal,
}

/// Server-side `scale_recipe` action payload.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScaledRecipeResponse {
    pub recipe_name: String,
    pub original_yield: u32,
    pub scaled_yield: u32,
    pub scale_factor: Decimal,
    pub original_batch_cost: Decimal,
    pub scaled_batch_cost: Decimal,
    pub scaled_ingredients: Vec<ScaledIngredientEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScaledIngredientEntry {
    pub name: String,
    pub original_quantity: Decimal,
    pub scaled_quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub scaled_cost: Decimal,
}

/// Body of `POST recipes/`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub yield_portions: u32,
    pub preparation_time: Option<u32>,
    pub ingredients: Vec<NewRecipeLine>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NewRecipeLine {
    pub ingredient_id: i64,
    pub quantity: Decimal,
}

impl From<&RecipeLineItem> for NewRecipeLine {
    fn from(item: &RecipeLineItem) -> Self {
        NewRecipeLine {
            ingredient_id: item.ingredient_id,
            quantity: item.quantity,
        }
    }
}

/// Body of `POST ingredients/` and `PUT ingredients/{id}/`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IngredientInput {
    pub name: String,
    pub unit: Unit,
    pub cost_per_unit: Decimal,
    pub current_stock: Decimal,
}

impl IngredientInput {
    /// Reject negative magnitudes before they leave the client.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KitchenError::invalid("Ingredient name cannot be empty"));
        }
        if self.cost_per_unit < Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Cost per unit cannot be negative: {}",
                self.cost_per_unit
            )));
        }
        if self.current_stock < Decimal::ZERO {
            return Err(KitchenError::invalid(format!(
                "Stock cannot be negative: {}",
                self.current_stock
            )));
        }
        Ok(())
    }
}

impl From<&Ingredient> for IngredientInput {
    fn from(ingredient: &Ingredient) -> Self {
        IngredientInput {
            name: ingredient.name.clone(),
            unit: ingredient.unit,
            cost_per_unit: ingredient.cost_per_unit,
            current_stock: ingredient.current_stock,
        }
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// Utility functions for conversions
impl From<ApiIngredientResponse> for Ingredient {
    fn from(api_response: ApiIngredientResponse) -> Self {
        let created_at = parse_timestamp(api_response.created_at.as_deref());
        let updated_at = parse_timestamp(api_response.updated_at.as_deref());

        Ingredient {
            id: api_response.id,
            name: api_response.name,
            unit: api_response.unit,
            unit_display: api_response.unit_display,
            cost_per_unit: api_response.cost_per_unit,
            current_stock: api_response.current_stock,
            created_at,
            updated_at,
        }
    }
}

impl From<ApiRecipeResponse> for RecipeInfo {
    fn from(api_response: ApiRecipeResponse) -> Self {
        let created_at = parse_timestamp(api_response.created_at.as_deref());
        let updated_at = parse_timestamp(api_response.updated_at.as_deref());

        let line_items = api_response
            .ingredients
            .iter()
            .map(|entry| RecipeLineItem::new(entry.ingredient, entry.quantity))
            .collect();

        let ingredients = api_response
            .ingredients
            .into_iter()
            .map(|entry| RecipeIngredientInfo {
                ingredient_id: entry.ingredient,
                name: entry.ingredient_name,
                unit: entry.ingredient_unit,
                quantity: entry.quantity,
                total_cost: entry.total_cost,
                available_stock: entry.available_stock,
                is_sufficient: entry.is_sufficient,
            })
            .collect();

        RecipeInfo {
            recipe: Recipe {
                id: Some(api_response.id),
                name: api_response.name,
                description: api_response.description.unwrap_or_default(),
                yield_portions: api_response.yield_portions,
                preparation_time: api_response.preparation_time,
                line_items,
            },
            batch_cost: api_response.batch_cost,
            cost_per_portion: api_response.cost_per_portion,
            producible_portions: api_response.producible_portions,
            ingredients,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_parsing() {
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Kilograms);
        assert_eq!("Tablespoons".parse::<Unit>().unwrap(), Unit::Tablespoons);
        assert_eq!(" TSP ".parse::<Unit>().unwrap(), Unit::Teaspoons);
        assert!("bushel".parse::<Unit>().is_err());

        assert_eq!(Unit::Cups.kind(), UnitKind::SpoonMeasure);
        assert_eq!(Unit::Liters.kind(), UnitKind::Volume);
    }

    #[test]
    fn test_ingredient_from_api_with_string_decimals() {
        let raw: ApiIngredientResponse = serde_json::from_value(json!({
            "id": 7,
            "name": "Harina",
            "unit": "kg",
            "unit_display": "Kilogramos",
            "cost_per_unit": "1.25",
            "current_stock": "12.50",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "not a date"
        }))
        .unwrap();

        let ingredient: Ingredient = raw.into();
        assert_eq!(ingredient.unit, Unit::Kilograms);
        assert_eq!(ingredient.cost_per_unit, Decimal::new(125, 2));
        assert_eq!(ingredient.current_stock, Decimal::new(1250, 2));
        assert_eq!(ingredient.unit_label(), "Kilogramos");
        assert!(ingredient.created_at.is_some());
        assert!(ingredient.updated_at.is_none());
    }

    #[test]
    fn test_recipe_info_keeps_only_ids_and_quantities_on_line_items() {
        let raw: ApiRecipeResponse = serde_json::from_value(json!({
            "id": 3,
            "name": "Tortilla",
            "description": null,
            "yield_portions": 4,
            "preparation_time": 30,
            "batch_cost": "6.00",
            "cost_per_portion": "1.50",
            "producible_portions": 8,
            "ingredients": [
                {
                    "id": 11,
                    "ingredient": 1,
                    "ingredient_name": "Huevos",
                    "ingredient_unit": "Unidades",
                    "quantity": "6.000",
                    "total_cost": "1.80",
                    "available_stock": "24.00",
                    "is_sufficient": true
                }
            ]
        }))
        .unwrap();

        let info: RecipeInfo = raw.into();
        assert_eq!(info.recipe.id, Some(3));
        assert_eq!(info.recipe.description, "");
        assert_eq!(
            info.recipe.line_items,
            vec![RecipeLineItem::new(1, Decimal::new(6, 0))]
        );
        assert_eq!(info.ingredients[0].name, "Huevos");
        assert_eq!(info.producible_portions, 8);
    }

    #[test]
    fn test_ingredient_input_rejects_negative_values() {
        let mut input = IngredientInput {
            name: "Sal".to_string(),
            unit: Unit::Grams,
            cost_per_unit: Decimal::new(1, 2),
            current_stock: Decimal::ZERO,
        };
        assert!(input.validate().is_ok());

        input.current_stock = Decimal::new(-1, 0);
        assert!(input.validate().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_new_recipe_serializes_ingredient_lines() {
        let body = NewRecipe {
            name: "Pan".to_string(),
            description: String::new(),
            yield_portions: 2,
            preparation_time: None,
            ingredients: vec![NewRecipeLine {
                ingredient_id: 5,
                quantity: Decimal::new(5, 1),
            }],
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["ingredients"][0]["ingredient_id"], json!(5));
        assert_eq!(value["ingredients"][0]["quantity"], json!("0.5"));
        assert_eq!(value["preparation_time"], json!(null));
    }
}
