use crate::dao::build_filter;
use crate::dao::DaoError;
use crate::dao::FilterFields;
use crate::dao::FilterKind;
use duckdb::params;
use duckdb::params_from_iter;
use duckdb::Connection;
use duckdb::Row;
use std::collections::BTreeMap;
use tracing::debug;

/// Table holding query models
const TABLE_NAME: &str = "Q_QUERY_MODEL";

/// Sequence the wizard numbers are drawn from
const WIZARD_NO_SEQUENCE: &str = "S_WIZARDNO";

/// Record properties and their columns, in select order.
const COLUMNS: [(&str, &str); 14] = [
    ("model_name", "MODEL_NAME"),
    ("model_type", "MODEL_TYPE"),
    ("owner_type", "OWNER_TYPE"),
    ("owner_code", "OWNER_CODE"),
    ("query_sql", "QUERY_SQL"),
    ("query_desc", "QUERY_DESC"),
    ("form_name_format", "FORM_NAME_FORMAT"),
    ("result_name", "RESULT_NAME"),
    ("row_draw_chart", "ROW_DRAW_CHART"),
    ("draw_chart_begin_col", "DRAW_CHART_BEGIN_COL"),
    ("draw_chart_end_col", "DRAW_CHART_END_COL"),
    ("addition_row", "ADDITION_ROW"),
    ("row_logic", "ROW_LOGIC"),
    ("row_logic_value", "ROW_LOGIC_VALUE"),
];

/// A statistics query definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryModel {
    pub model_name: String,
    pub model_type: Option<String>,
    pub owner_type: Option<String>,
    pub owner_code: Option<String>,
    pub query_sql: Option<String>,
    pub query_desc: Option<String>,
    pub form_name_format: Option<String>,
    pub result_name: Option<String>,
    pub row_draw_chart: Option<String>,
    pub draw_chart_begin_col: Option<i32>,
    pub draw_chart_end_col: Option<i32>,
    pub addition_row: Option<String>,
    pub row_logic: Option<String>,
    pub row_logic_value: Option<String>,
}

impl QueryModel {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            model_name: row.get(0)?,
            model_type: row.get(1)?,
            owner_type: row.get(2)?,
            owner_code: row.get(3)?,
            query_sql: row.get(4)?,
            query_desc: row.get(5)?,
            form_name_format: row.get(6)?,
            result_name: row.get(7)?,
            row_draw_chart: row.get(8)?,
            draw_chart_begin_col: row.get(9)?,
            draw_chart_end_col: row.get(10)?,
            addition_row: row.get(11)?,
            row_logic: row.get(12)?,
            row_logic_value: row.get(13)?,
        })
    }
}

fn column_of(property: &str) -> Option<&'static str> {
    COLUMNS
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, column)| *column)
}

fn select_columns() -> String {
    COLUMNS
        .iter()
        .map(|(_, column)| *column)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FilterFields {
    /// Filter declaration of [`QueryModel`]: the name matches exactly, everything else by substring.
    pub fn query_model() -> Self {
        COLUMNS
            .iter()
            .map(|(property, _)| {
                let kind = if *property == "model_name" {
                    FilterKind::Equal
                } else {
                    FilterKind::Like
                };
                (*property, kind)
            })
            .collect()
    }
}

/// Data access object for [`QueryModel`] records.
pub struct QueryModelDao {
    connection: Connection,
    filter_fields: FilterFields,
}

impl QueryModelDao {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            filter_fields: FilterFields::query_model(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Properties that can be filtered on, and how.
    pub fn filter_fields(&self) -> &FilterFields {
        &self.filter_fields
    }

    /// Creates the query model table and the wizard number sequence if missing.
    pub fn create_schema(&self) -> Result<(), DaoError> {
        self.connection.execute_batch(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {WIZARD_NO_SEQUENCE} START 1;
             CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
                 MODEL_NAME VARCHAR PRIMARY KEY,
                 MODEL_TYPE VARCHAR,
                 OWNER_TYPE VARCHAR,
                 OWNER_CODE VARCHAR,
                 QUERY_SQL VARCHAR,
                 QUERY_DESC VARCHAR,
                 FORM_NAME_FORMAT VARCHAR,
                 RESULT_NAME VARCHAR,
                 ROW_DRAW_CHART VARCHAR,
                 DRAW_CHART_BEGIN_COL INTEGER,
                 DRAW_CHART_END_COL INTEGER,
                 ADDITION_ROW VARCHAR,
                 ROW_LOGIC VARCHAR,
                 ROW_LOGIC_VALUE VARCHAR
             );"
        ))?;
        Ok(())
    }

    /// Fetches and consumes the next wizard number.
    pub fn next_wizard_no(&self) -> Result<String, DaoError> {
        let value: i64 = self.connection.query_row(
            &format!("SELECT nextval('{WIZARD_NO_SEQUENCE}')"),
            [],
            |row| row.get(0),
        )?;
        Ok(value.to_string())
    }

    /// Lists query models matching the criteria, ordered by name.
    pub fn list_objects(&self, criteria: &BTreeMap<String, String>) -> Result<Vec<QueryModel>, DaoError> {
        let clause = build_filter(&self.filter_fields, column_of, criteria);
        let sql = format!(
            "SELECT {} FROM {TABLE_NAME}{} ORDER BY MODEL_NAME",
            select_columns(),
            clause.to_where()
        );
        debug!(sql = %sql, params = ?clause.params, "listing query models");
        let mut statement = self.connection.prepare(&sql)?;
        let models = statement
            .query_map(params_from_iter(clause.params.iter()), QueryModel::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(models)
    }

    pub fn get_object_by_id(&self, model_name: &str) -> Result<Option<QueryModel>, DaoError> {
        let sql = format!("SELECT {} FROM {TABLE_NAME} WHERE MODEL_NAME = ?", select_columns());
        match self.connection.query_row(&sql, [model_name], QueryModel::from_row) {
            Ok(model) => Ok(Some(model)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_new_object(&self, model: &QueryModel) -> Result<(), DaoError> {
        let placeholders = vec!["?"; COLUMNS.len()].join(", ");
        let sql = format!("INSERT INTO {TABLE_NAME} ({}) VALUES ({placeholders})", select_columns());
        self.connection.execute(
            &sql,
            params![
                model.model_name,
                model.model_type,
                model.owner_type,
                model.owner_code,
                model.query_sql,
                model.query_desc,
                model.form_name_format,
                model.result_name,
                model.row_draw_chart,
                model.draw_chart_begin_col,
                model.draw_chart_end_col,
                model.addition_row,
                model.row_logic,
                model.row_logic_value,
            ],
        )?;
        debug!(model_name = %model.model_name, "saved query model");
        Ok(())
    }

    /// Deletes a query model, returning whether a row was removed.
    pub fn delete_object_by_id(&self, model_name: &str) -> Result<bool, DaoError> {
        let deleted = self
            .connection
            .execute(&format!("DELETE FROM {TABLE_NAME} WHERE MODEL_NAME = ?"), [model_name])?;
        Ok(deleted > 0)
    }
}
