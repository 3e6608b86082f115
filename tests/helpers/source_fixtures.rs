//! Common RAML documents for tests.

pub const PERSON_API: &str = r#"#%RAML 1.0
title: People
types:
  Person:
    properties:
      id: integer
      name: string
      email?:
        type: string
        pattern: ^.+@.+$
  Employee:
    type: Person
    properties:
      salary:
        type: number
        minimum: 0
"#;

pub const BASE_URI_API: &str = r#"#%RAML 1.0
title: Tenants
version: v1
baseUri: https://{organization}.example.com/{version}/{service}
baseUriParameters:
  service:
    enum: [billing, search]
/users:
  /{userId}:
    uriParameters:
      userId: integer
    /items/{itemId}:
      get:
"#;

pub const COLLECTION_API: &str = r#"#%RAML 1.0
title: Catalog
resourceTypes:
  collection:
    usage: A collection of <<resourcePathName>>
    description: All <<resourcePathName>>
    get:
      description: List <<resourcePathName>>, at most <<limit>> per page
      responses:
        200:
          body:
            application/json:
              type: <<item>>[]
    post?:
      description: Create one <<resourcePathName | !singularize>>
traits:
  secured:
    headers:
      X-Flag:
        default: secured
  traced:
    headers:
      X-Flag:
        default: traced
      X-Trace: string
types:
  Book:
    properties:
      isbn: string
/books:
  type:
    collection:
      item: Book
      limit: 20
  is: [secured]
  get:
    is: [traced]
  /{isbn}:
    get:
      description: One book
"#;

pub const LIBRARY_ROOT: &str = r#"#%RAML 1.0
title: Shop
uses:
  shop: libraries/shop.raml
/orders:
  type: shop.collection
  get:
"#;

pub const SHOP_LIBRARY: &str = r#"#%RAML 1.0 Library
usage: Shared shop declarations
uses:
  common: common.raml
types:
  Order:
    properties:
      id: common.Id
resourceTypes:
  collection:
    get:
      is: [paged]
      responses:
        200:
          body:
            application/json: Order[]
traits:
  paged:
    queryParameters:
      page: common.Id
"#;

pub const COMMON_LIBRARY: &str = r#"#%RAML 1.0 Library
types:
  Id:
    type: integer
    minimum: 1
"#;
