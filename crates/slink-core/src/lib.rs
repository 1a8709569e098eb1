//! Exact single-linkage hierarchical clustering via Sibson's SLINK
//! algorithm.
//!
//! `cluster` computes the pointer representation `(pi, lambda)` of the
//! dendrogram over `n` points in `R^d`, in `O(n^2)` time and `O(n)`
//! additional space. Seven interchangeable distance kernels (a scalar
//! reference plus six `x86_64` SIMD variants) feed the update loop, and
//! stages 2, 4, and 5 of that loop can run on a worker pool independently
//! sized per stage.
//!
//! ```
//! use slink_core::{cluster, ClusterConfig, Linearized};
//!
//! let points = [0.0, 0.0, 2.0, 3.0];
//! let view = Linearized::new(&points, 2, 2, 2).unwrap();
//! let mut pi = vec![0usize; 2];
//! let mut lambda = vec![0.0f64; 2];
//! cluster(&view, &mut pi, &mut lambda, &ClusterConfig::default()).unwrap();
//! assert_eq!(pi, vec![1, 1]);
//! assert!(lambda[1].is_infinite());
//! ```

pub mod alloc_guard;
pub mod config;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod layout;
pub mod scheduler;

pub use config::{ClusterConfig, ThreadConfig};
pub use engine::cluster;
pub use error::{Error, Result};
pub use kernel::{Distance, Kernel, SquaredDistance};
pub use layout::{AlignedPoints, Indirect, Linearized, Points};
