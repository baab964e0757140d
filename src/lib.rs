//! Traefik Config Compiler는 멀티 테넌트 터널 게이트웨이의 리소스 스냅샷을
//! 엣지 프록시(Traefik)가 HTTP provider로 받아 가는 동적 설정 문서로 컴파일합니다.
//!
//! # 주요 기능
//!
//! - 호스트 이름/경로 단위 HTTP 라우터 생성 (multi, redirect 모드)
//! - TCP/UDP 리소스의 전용 엔트리포인트 라우팅
//! - 사이트 온라인 상태를 반영한 백엔드 선택
//! - 도메인별 인증서 리졸버와 와일드카드 인증서 정책
//!
//! # 예제
//!
//! ```
//! use traefik_config_compiler::compiler::ConfigCompiler;
//! use traefik_config_compiler::settings::TraefikSettings;
//! use traefik_config_compiler::store::Snapshot;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let compiler = ConfigCompiler::new(TraefikSettings::default()).unwrap();
//!
//! // 빈 스냅샷은 빈 문서(`{}`)가 됩니다.
//! let config = compiler.compile(&Snapshot::default()).await.unwrap();
//! assert_eq!(config.to_json().unwrap(), "{}");
//! # }
//! ```

pub mod compiler;
pub mod document;
pub mod logging;
pub mod model;
pub mod server;
pub mod settings;
pub mod store;
