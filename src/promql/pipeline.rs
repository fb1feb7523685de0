use crate::models::grafana::{
    DatasourceRef, EXPRESSION_DATASOURCE_UID, ExpressionKind, ExpressionModel, QueryModel,
    QueryStage, Reducer, RefId, RelativeTimeRange, StageModel,
};

use super::threshold::{SplitExpr, split_expr};

/// Parameters of the raw metrics query (stage `A`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub datasource_uid: String,
    pub lookback_secs: u64,
    pub interval_ms: u64,
    pub max_data_points: u64,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            datasource_uid: "prometheus".to_string(),
            lookback_secs: 600,
            interval_ms: 1000,
            max_data_points: 43200,
        }
    }
}

/// Build the query → reduce → threshold pipeline for an alert expression,
/// using the default Prometheus datasource settings.
pub fn synthesize(expr: &str) -> Vec<QueryStage> {
    synthesize_with(expr, &QueryOptions::default())
}

pub fn synthesize_with(expr: &str, opts: &QueryOptions) -> Vec<QueryStage> {
    stages_for(&split_expr(expr), opts)
}

/// Always three stages, in `A`, `B`, `C` order. `B` reads `A` by refId and
/// `C` reads `$B`, so the ids are fixed.
pub fn stages_for(split: &SplitExpr, opts: &QueryOptions) -> Vec<QueryStage> {
    vec![
        QueryStage {
            ref_id: RefId::A,
            relative_time_range: RelativeTimeRange::lookback(opts.lookback_secs),
            datasource_uid: opts.datasource_uid.clone(),
            model: StageModel::Query(QueryModel {
                expr: split.base_query.clone(),
                ref_id: RefId::A,
                datasource: DatasourceRef::prometheus(opts.datasource_uid.clone()),
                interval_ms: opts.interval_ms,
                max_data_points: opts.max_data_points,
            }),
        },
        expression_stage(RefId::B, ExpressionKind::Reduce, RefId::A.to_string(), Some(Reducer::Last)),
        expression_stage(RefId::C, ExpressionKind::Math, split.condition(), None),
    ]
}

fn expression_stage(
    ref_id: RefId,
    kind: ExpressionKind,
    expression: String,
    reducer: Option<Reducer>,
) -> QueryStage {
    QueryStage {
        ref_id,
        relative_time_range: RelativeTimeRange::instant(),
        datasource_uid: EXPRESSION_DATASOURCE_UID.to_string(),
        model: StageModel::Expression(ExpressionModel {
            kind,
            expression,
            reducer,
            ref_id,
            datasource: DatasourceRef::expression(),
        }),
    }
}
