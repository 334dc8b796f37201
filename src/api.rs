use async_graphql::{EmptyMutation, EmptySubscription, MergedObject};

use crate::{
    dashboard::{Dashboard, OverviewQuery},
    stats::{
        complaint::ComplaintStatQuery, neighbourhood::NeighbourhoodStatQuery,
        price::PriceStatQuery, room_type::RoomTypeStatQuery,
    },
};

/// A set of queries defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub(crate) struct Query(
    OverviewQuery,
    PriceStatQuery,
    RoomTypeStatQuery,
    ComplaintStatQuery,
    NeighbourhoodStatQuery,
);

pub(crate) type Schema = async_graphql::Schema<Query, EmptyMutation, EmptySubscription>;

pub(crate) fn schema(dashboard: Dashboard) -> Schema {
    Schema::build(Query::default(), EmptyMutation, EmptySubscription)
        .data(dashboard)
        .finish()
}

#[cfg(test)]
struct TestSchema {
    schema: Schema,
}

#[cfg(test)]
impl TestSchema {
    fn new(records: Vec<crate::dataset::CleanRecord>) -> Self {
        let dashboard = Dashboard::new(
            crate::dataset::dataset(records),
            crate::settings::AnalysisSettings::default(),
            None,
        );
        Self {
            schema: schema(dashboard),
        }
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        let request: async_graphql::Request = query.into();
        self.schema.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::TestSchema;
    use crate::dataset::{record, CleanRecord};

    fn reviews() -> Vec<CleanRecord> {
        (1..=10)
            .map(|i| {
                let (comments, sentiment) = if i <= 4 {
                    ("The heater was broken and the host never replied", -0.7)
                } else {
                    ("Lovely stay", 0.7)
                };
                let room_type = if i <= 6 { "Private room" } else { "Entire home/apt" };
                record(f64::from(i) * 30.0, room_type, "Silver Lake", comments, sentiment)
            })
            .collect()
    }

    #[tokio::test]
    async fn overview() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            overview {
                rowsRead
                recordCount
                priceBins { label lower upper }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["overview"]["rowsRead"], 10);
        assert_eq!(data["overview"]["recordCount"], 10);
        assert_eq!(data["overview"]["priceBins"][0]["label"], "Very Low");
        assert_eq!(data["overview"]["priceBins"][0]["lower"], 30.0);
        assert_eq!(data["overview"]["priceBins"][4]["upper"], 300.0);
    }

    #[tokio::test]
    async fn price_sentiment() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            priceSentiment {
                group
                recordCount
                negativePct
                neutralPct
                positivePct
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["priceSentiment"],
            serde_json::json!([
                { "group": "Very Low", "recordCount": 2, "negativePct": 100.0, "neutralPct": 0.0, "positivePct": 0.0 },
                { "group": "Low", "recordCount": 2, "negativePct": 100.0, "neutralPct": 0.0, "positivePct": 0.0 },
                { "group": "Mid", "recordCount": 2, "negativePct": 0.0, "neutralPct": 0.0, "positivePct": 100.0 },
                { "group": "High", "recordCount": 2, "negativePct": 0.0, "neutralPct": 0.0, "positivePct": 100.0 },
                { "group": "Very High", "recordCount": 2, "negativePct": 0.0, "neutralPct": 0.0, "positivePct": 100.0 }
            ])
        );
    }

    #[tokio::test]
    async fn price_negative_probability() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            priceNegativeProbability {
                group
                probability
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        let rows = &data["priceNegativeProbability"];
        assert_eq!(rows.as_array().unwrap().len(), 5);
        assert_eq!(rows[0]["probability"], 1.0);
        assert_eq!(rows[2]["group"], "Mid");
        assert_eq!(rows[2]["probability"], 0.0);
    }

    #[tokio::test]
    async fn room_type_tables() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            roomTypeSentiment {
                group
                recordCount
            }
            roomTypeNegativeProbability {
                group
                probability
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["roomTypeSentiment"][0]["group"], "Private room");
        assert_eq!(data["roomTypeSentiment"][0]["recordCount"], 6);
        assert_eq!(data["roomTypeSentiment"][1]["group"], "Entire home/apt");
        assert_eq!(data["roomTypeNegativeProbability"][1]["probability"], 0.0);
    }

    #[tokio::test]
    async fn complaints() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            complaintKeywords {
                keyword
                count
            }
            topComplaints {
                keyword
                count
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["complaintKeywords"].as_array().unwrap().len(), 15);
        assert_eq!(
            data["topComplaints"],
            serde_json::json!([
                { "keyword": "heat", "count": 4 },
                { "keyword": "host", "count": 4 },
                { "keyword": "wifi", "count": 0 },
                { "keyword": "internet", "count": 0 },
                { "keyword": "noise", "count": 0 }
            ])
        );
    }

    #[tokio::test]
    async fn neighbourhoods() {
        let schema = TestSchema::new(reviews());
        let query = r"
        {
            neighbourhoods {
                neighbourhood
                reviewCount
                meanPrice
                topTier
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(
            data["neighbourhoods"],
            serde_json::json!([
                { "neighbourhood": "Silver Lake", "reviewCount": 10, "meanPrice": 165.0, "topTier": true }
            ])
        );
    }
}
