// @generated
/// Generated client implementations.
pub mod g_rpc_mdt_dialout_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct GRpcMdtDialoutClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GRpcMdtDialoutClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GRpcMdtDialoutClient<T>
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
        pub async fn mdt_dialout(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::MdtDialoutArgs>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::MdtDialoutArgs>>,
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
                "/mdt_dialout.gRPCMdtDialout/MdtDialout",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("mdt_dialout.gRPCMdtDialout", "MdtDialout"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
// @generated
/// Generated server implementations.
pub mod g_rpc_mdt_dialout_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with GRpcMdtDialoutServer.
    #[async_trait]
    pub trait GRpcMdtDialout: Send + Sync + 'static {
        /// Server streaming response type for the MdtDialout method.
        type MdtDialoutStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<super::MdtDialoutArgs, tonic::Status>,
            >
            + Send
            + 'static;
        async fn mdt_dialout(
            &self,
            request: tonic::Request<tonic::Streaming<super::MdtDialoutArgs>>,
        ) -> std::result::Result<tonic::Response<Self::MdtDialoutStream>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct GRpcMdtDialoutServer<T: GRpcMdtDialout> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }
    impl<T: GRpcMdtDialout> GRpcMdtDialoutServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
                max_decoding_message_size: None,
                max_encoding_message_size: None,
            }
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.max_decoding_message_size = Some(limit);
            self
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for GRpcMdtDialoutServer<T>
    where
        T: GRpcMdtDialout,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/mdt_dialout.gRPCMdtDialout/MdtDialout" => {
                    #[allow(non_camel_case_types)]
                    struct MdtDialoutSvc<T: GRpcMdtDialout>(pub Arc<T>);
                    impl<
                        T: GRpcMdtDialout,
                    > tonic::server::StreamingService<super::MdtDialoutArgs>
                    for MdtDialoutSvc<T> {
                        type Response = super::MdtDialoutArgs;
                        type ResponseStream = T::MdtDialoutStream;
                        type Future = BoxFuture<
                            tonic::Response<Self::ResponseStream>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<super::MdtDialoutArgs>>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as GRpcMdtDialout>::mdt_dialout(&inner, request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = MdtDialoutSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        let mut response = http::Response::new(empty_body());
                        let headers = response.headers_mut();
                        headers
                            .insert(
                                tonic::Status::GRPC_STATUS,
                                (tonic::Code::Unimplemented as i32).into(),
                            );
                        headers
                            .insert(
                                http::header::CONTENT_TYPE,
                                tonic::metadata::GRPC_CONTENT_TYPE,
                            );
                        Ok(response)
                    })
                }
            }
        }
    }
    impl<T: GRpcMdtDialout> Clone for GRpcMdtDialoutServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }
    /// Generated gRPC service name
    pub const SERVICE_NAME: &str = "mdt_dialout.gRPCMdtDialout";
    impl<T: GRpcMdtDialout> tonic::server::NamedService for GRpcMdtDialoutServer<T> {
        const NAME: &'static str = SERVICE_NAME;
    }
}
