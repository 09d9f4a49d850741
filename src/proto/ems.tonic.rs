// @generated
/// Generated client implementations.
pub mod g_rpc_config_oper_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct GRpcConfigOperClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl<T> GRpcConfigOperClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub async fn create_subs(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateSubsArgs>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::CreateSubsReply>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/IOSXRExtensibleManagebilityService.gRPCConfigOper/CreateSubs",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(
                    GrpcMethod::new(
                        "IOSXRExtensibleManagebilityService.gRPCConfigOper",
                        "CreateSubs",
                    ),
                );
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
