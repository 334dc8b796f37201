use std::{convert::Infallible, net::SocketAddr};

use async_graphql::http::GraphiQLSource;
use async_graphql_warp::GraphQLResponse;
use tracing::info;
use warp::{http::Response as HttpResponse, Filter};

use crate::api::Schema;

/// Serves the schema at `/graphql` and a GraphiQL page at `/` until the
/// process is stopped.
pub(crate) async fn serve(schema: Schema, addr: SocketAddr) {
    let graphql = warp::path("graphql")
        .and(warp::path::end())
        .and(async_graphql_warp::graphql(schema))
        .and_then(|(schema, request): (Schema, async_graphql::Request)| async move {
            Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
        });

    let graphiql = warp::path::end().and(warp::get()).map(|| {
        HttpResponse::builder()
            .header("content-type", "text/html")
            .body(GraphiQLSource::build().endpoint("/graphql").finish())
    });

    info!("Serving dashboard tables on http://{addr}/graphql");
    warp::serve(graphiql.or(graphql)).run(addr).await;
}
