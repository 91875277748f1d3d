#![allow(dead_code)]

use oxide_rest_core::{
    ColumnInfo, FilterError, PlanBuilder, QueryParams, QueryPlan, SqlValue, TableSchema,
};

pub fn countries() -> TableSchema {
    TableSchema::new("countries")
        .column(ColumnInfo::new("id", "INTEGER").primary_key())
        .column(ColumnInfo::new("iso3166alpha3", "VARCHAR(3)"))
        .column(ColumnInfo::new("name", "TEXT"))
        .column(ColumnInfo::new("tld", "TEXT"))
        .column(ColumnInfo::new("population", "INTEGER"))
        .column(ColumnInfo::new("flag_gif", "BLOB"))
        .unique_index(&["iso3166alpha3"])
}

pub fn read_plan(query: &str) -> QueryPlan {
    let table = countries();
    PlanBuilder::read(&table)
        .extend(&QueryParams::parse(query))
        .unwrap_or_else(|e| panic!("Failed to plan: {query}\nError: {e:?}"))
        .build()
}

pub fn read_err(query: &str) -> FilterError {
    let table = countries();
    PlanBuilder::read(&table)
        .extend(&QueryParams::parse(query))
        .map(PlanBuilder::build)
        .expect_err(&format!("Expected grammar error for: {query}"))
}

pub fn delete_plan(query: &str) -> QueryPlan {
    let table = countries();
    PlanBuilder::delete(&table)
        .extend(&QueryParams::parse(query))
        .unwrap_or_else(|e| panic!("Failed to plan: {query}\nError: {e:?}"))
        .build()
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}
