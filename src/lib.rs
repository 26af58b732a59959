/// 内部实现模块
mod internal;

#[cfg(test)]
mod tests;

/// 导出核心错误类型
pub use internal::error::{DavError, DavResult};

pub mod auth {
    use crate::internal;
    pub use internal::auth::structs::webdav_auth::{AuthScheme, WebdavAuth};
    pub use internal::auth::traits::sign::{SignAbort, SignRequest};
}

/// 路径工具：规范化 / 拼接 / 相对化，纯函数无 IO
pub mod paths {
    use crate::internal;
    pub use internal::paths::{decode_path, join_path, normalize_path, relative_to};
}

/// 对外提供 webdav 协议层能力，不限制死在客户端方法里，以防有人要自己拼请求
pub mod webdav {
    pub mod enums {
        use crate::internal;
        pub use internal::webdav::enums::{Depth, WebDavMethod};
    }

    pub mod structs {
        pub use crate::internal::webdav::raw_xml::raw_file::{MultiStatus, RawProps, RawResponse};
    }

    pub mod traits {
        pub use crate::internal::webdav::raw_xml::impl_multi_status::ToResourceInfos;
    }

    pub mod functions {
        pub use crate::internal::webdav::functions::propfind_body::{
            PROPFIND_ALLPROP_BODY, PROPFIND_BODY,
        };
        pub use crate::internal::webdav::raw_xml::impl_multi_status::children_only;
        pub use crate::internal::webdav::raw_xml::raw_file::parse_multi_status;
    }
}

pub mod client {
    use crate::internal;
    pub use internal::client::structs::cancel_flag::CancelFlag;
    pub use internal::client::structs::client_config::{ClientConfig, RetryConfig};
    pub use internal::client::structs::webdav_client::WebdavClient;
}

pub mod lister {
    use crate::internal;
    pub use internal::lister::functions::scan_local_tree::scan_local_tree;
    pub use internal::lister::structs::resource_info::{ResourceInfo, ResourceKind};
    pub use internal::lister::structs::resource_lister::{ListDepth, ResourceLister};
    pub use internal::lister::structs::resource_tree::{ListError, ResourceTree};
}

pub mod sync {
    use crate::internal;
    pub use internal::sync::structs::sync_action::{SyncAction, SyncMode, SyncPlan, SyncSide};
    pub use internal::sync::structs::sync_executor::{ActionOutcome, SyncExecutor, SyncReport};
    pub use internal::sync::structs::sync_planner::SyncPlanner;
}

pub mod batch {
    use crate::internal;
    pub use internal::batch::structs::batch_runner::{BatchReport, BatchRunner};
    pub use internal::batch::structs::command::{BatchError, Command, CommandVerb, parse_script};
}
