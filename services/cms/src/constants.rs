// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

pub const DEFAULT_BASE_URL: &str = "vcloud.volarvideo.com";

// Query parameters injected by the signer.
pub const API_KEY: &str = "api_key";
pub const SIGNATURE: &str = "signature";

// Parameters handled by the resource operations.
pub const SITE: &str = "site";
pub const ID: &str = "id";
pub const SITES: &str = "sites";
pub const TMP_FILE_ID: &str = "tmp_file_id";
pub const TMP_FILE_NAME: &str = "tmp_file_name";
pub const FILENAME: &str = "filename";

pub const ROUTE_S3_HANDSHAKE: &str = "api/client/broadcast/s3handshake";

// Env values used by the client.
pub const VOLAR_API_KEY: &str = "VOLAR_API_KEY";
pub const VOLAR_SECRET: &str = "VOLAR_SECRET";
pub const VOLAR_BASE_URL: &str = "VOLAR_BASE_URL";
pub const VOLAR_SECURE: &str = "VOLAR_SECURE";

// Headers used by the storage upload.
pub const X_AMZ_ACL: &str = "x-amz-acl";
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - `/` is kept since object keys are used as paths.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
